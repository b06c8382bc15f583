//! passagedb-vector
//!
//! Dense retrieval: an exact cosine-similarity scan over a row-normalized
//! candle tensor loaded from the `embeddings.npy` artifact.

pub mod dense;

pub use dense::{DenseIndex, QUERY_EPSILON};
