//! Passage store: the ordered, immutable passage list of one generation.

use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use crate::artifacts::read_artifact;
use crate::error::{Error, Result};
use crate::types::{normalize_text, Passage};

#[derive(Debug, Clone, Default)]
pub struct PassageStore {
    passages: Vec<Passage>,
}

impl PassageStore {
    /// Build a store from in-memory passages, normalizing text and rejecting
    /// duplicate ids.
    pub fn from_passages(passages: Vec<Passage>) -> Result<Self> {
        let passages: Vec<Passage> = passages.into_iter().map(|mut p| { p.text = normalize_text(&p.text); p }).collect();
        let mut seen = HashSet::with_capacity(passages.len());
        for p in &passages {
            if !seen.insert(p.id.as_str()) {
                return Err(Error::corrupt("<memory>", format!("duplicate chunk_id '{}'", p.id)));
            }
        }
        Ok(Self { passages })
    }

    /// Load `metadata.jsonl`: one JSON record per line, blank lines skipped,
    /// file order preserved.
    pub fn load(path: &Path) -> Result<Self> {
        let started = Instant::now();
        let content = read_artifact(path)?;
        let mut passages = Vec::new();
        let mut seen = HashSet::new();
        for (i, line) in content.lines().enumerate() {
            let line_no = i + 1;
            if line.trim().is_empty() { continue; }
            let mut passage: Passage = serde_json::from_str(line).map_err(|e| Error::corrupt_line(path, line_no, e.to_string()))?;
            if passage.id.trim().is_empty() {
                return Err(Error::corrupt_line(path, line_no, "empty chunk_id"));
            }
            if !seen.insert(passage.id.clone()) {
                return Err(Error::corrupt_line(path, line_no, format!("duplicate chunk_id '{}'", passage.id)));
            }
            passage.text = normalize_text(&passage.text);
            passages.push(passage);
        }
        tracing::info!(path = %path.display(), passages = passages.len(), elapsed_ms = started.elapsed().as_millis() as u64, "loaded passage store");
        Ok(Self { passages })
    }

    pub fn len(&self) -> usize { self.passages.len() }

    pub fn is_empty(&self) -> bool { self.passages.is_empty() }

    pub fn get(&self, row: usize) -> Option<&Passage> { self.passages.get(row) }

    pub fn passages(&self) -> &[Passage] { &self.passages }

    pub fn iter(&self) -> std::slice::Iter<'_, Passage> { self.passages.iter() }

    pub fn position(&self, id: &str) -> Option<usize> { self.passages.iter().position(|p| p.id == id) }
}
