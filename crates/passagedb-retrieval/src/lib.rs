//! passagedb-retrieval
//!
//! Strategy selection, swappable generations, context assembly and the
//! service facade used by transports.

pub mod answer;
pub mod context;
pub mod generation;
pub mod retriever;
pub mod service;

pub use answer::{render_sources_digest, AnswerOutcome};
pub use context::{assemble, build_context, ContextBlock};
pub use generation::{Generation, GenerationInfo, GenerationLoader, IndexHandle};
pub use retriever::{Query, Retriever};
pub use service::RetrievalService;
