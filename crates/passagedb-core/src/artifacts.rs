//! Fixed on-disk layout of an index directory.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const METADATA_FILE: &str = "metadata.jsonl";
pub const EMBEDDINGS_FILE: &str = "embeddings.npy";
pub const LEXICAL_TOKENS_FILE: &str = "bm25_tokens.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    dir: PathBuf,
}

impl ArtifactLayout {
    pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

    pub fn dir(&self) -> &Path { &self.dir }

    pub fn metadata(&self) -> PathBuf { self.dir.join(METADATA_FILE) }

    pub fn embeddings(&self) -> PathBuf { self.dir.join(EMBEDDINGS_FILE) }

    pub fn lexical_tokens(&self) -> PathBuf { self.dir.join(LEXICAL_TOKENS_FILE) }
}

/// Fail with `CorpusMissing` unless `path` is an existing file.
pub fn require_file(path: &Path) -> Result<()> {
    if path.is_file() { Ok(()) } else { Err(Error::CorpusMissing { path: path.to_path_buf() }) }
}

/// Read a whole artifact, mapping absence to `CorpusMissing`.
pub fn read_artifact(path: &Path) -> Result<String> {
    require_file(path)?;
    std::fs::read_to_string(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::InvalidData => Error::corrupt(path, "not valid UTF-8"),
        _ => Error::Io { path: path.to_path_buf(), source },
    })
}
