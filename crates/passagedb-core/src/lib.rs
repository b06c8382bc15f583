//! passagedb-core
//!
//! Shared domain types, errors, configuration and the passage store used by
//! the lexical and dense engines.

pub mod artifacts;
pub mod config;
pub mod error;
pub mod ranking;
pub mod store;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use store::PassageStore;
pub use types::{Passage, RetrievedPassage, SearchHit, SourceKind};
