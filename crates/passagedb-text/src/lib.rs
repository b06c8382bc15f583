//! passagedb-text
//!
//! Lexical retrieval: the shared tokenizer (a Tantivy text analyzer), the
//! BM25 index and the persisted token-sequence artifact.

pub mod artifact;
pub mod bm25;
pub mod tokenize;

pub use bm25::{Bm25Index, Bm25Params};
pub use tokenize::PassageTokenizer;
