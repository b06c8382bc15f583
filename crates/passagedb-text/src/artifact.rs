//! The persisted lexical artifact: a JSON array of per-passage token arrays,
//! row-aligned with `metadata.jsonl`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use passagedb_core::artifacts::read_artifact;
use passagedb_core::error::{Error, Result};
use passagedb_core::{Passage, PassageStore};

use crate::tokenize::PassageTokenizer;

pub fn read_token_sequences(path: &Path) -> Result<Vec<Vec<String>>> {
	let content = read_artifact(path)?;
	serde_json::from_str(&content).map_err(|e| Error::corrupt(path, format!("expected an array of token arrays: {e}")))
}

pub fn write_token_sequences(path: &Path, sequences: &[Vec<String>]) -> Result<()> {
	let io_err = |source| Error::Io { path: path.to_path_buf(), source };
	let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
	serde_json::to_writer(&mut writer, sequences).map_err(|e| Error::Io { path: path.to_path_buf(), source: e.into() })?;
	writer.flush().map_err(io_err)
}

pub fn tokenize_store(store: &PassageStore, tokenizer: &PassageTokenizer) -> Vec<Vec<String>> {
	tokenize_passages(store.iter(), tokenizer)
}

/// One token sequence per passage, in iteration order. Callers may wrap the
/// iterator to observe progress.
pub fn tokenize_passages<'a>(passages: impl Iterator<Item = &'a Passage>, tokenizer: &PassageTokenizer) -> Vec<Vec<String>> {
	passages.map(|p| tokenizer.tokenize(&p.text)).collect()
}
