use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Corpus artifact missing: {}", .path.display())]
    CorpusMissing { path: PathBuf },

    #[error("Corpus artifact corrupt: {}{}: {reason}", .path.display(), .line.map(|l| format!(":{l}")).unwrap_or_default())]
    CorpusCorrupt {
        path: PathBuf,
        /// 1-based line for line-oriented artifacts.
        line: Option<usize>,
        reason: String,
    },

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Query is empty")]
    EmptyQuery,

    #[error("No index generation loaded; load or reload first")]
    IndexUnavailable,

    #[error("Unsupported query: {0}")]
    UnsupportedQuery(String),

    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CorpusCorrupt { path: path.into(), line: None, reason: reason.into() }
    }

    pub fn corrupt_line(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        Self::CorpusCorrupt { path: path.into(), line: Some(line), reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
