//! Domain types shared by the lexical and dense engines.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

pub type PassageId = String;

/// An immutable unit of retrievable text.
///
/// - `id`: unique within a loaded generation, persisted as `chunk_id`
/// - `text`: normalized plain text (see [`normalize_text`])
/// - `source`: origin file path or identifier
/// - `page`: 1-based page number, 0 when not applicable
/// - `title`: human-readable origin label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    #[serde(rename = "chunk_id")]
    pub id: PassageId,
    pub text: String,
    pub source: String,
    #[serde(deserialize_with = "page_or_zero")]
    pub page: u32,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub title: String,
}

impl Passage {
    /// File name of `source`, or the whole string when it has none.
    pub fn source_name(&self) -> &str {
        Path::new(&self.source).file_name().and_then(|n| n.to_str()).unwrap_or(&self.source)
    }
}

// `page` must be present; an explicit null means "not applicable".
fn page_or_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}

// `title` may be absent or null.
fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Indicates which engine produced a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Dense,
    Lexical,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dense => f.write_str("dense"),
            Self::Lexical => f.write_str("lexical"),
        }
    }
}

/// The minimal surface returned by both engines.
///
/// `row` is the passage position in load order. `score` is engine-specific
/// but higher is always better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub row: usize,
    pub score: f32,
    pub source: SourceKind,
}

/// A ranked passage as handed to the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedPassage {
    #[serde(rename = "chunk_id")]
    pub id: PassageId,
    pub source: String,
    pub page: u32,
    pub title: String,
    pub text: String,
    pub score: f32,
}

impl RetrievedPassage {
    pub fn from_hit(passage: &Passage, hit: &SearchHit) -> Self {
        Self {
            id: passage.id.clone(),
            source: passage.source.clone(),
            page: passage.page,
            title: passage.title.clone(),
            text: passage.text.clone(),
            score: hit.score,
        }
    }

    pub fn source_name(&self) -> &str {
        Path::new(&self.source).file_name().and_then(|n| n.to_str()).unwrap_or(&self.source)
    }
}

/// Collapse whitespace runs to one space, turn NBSP into a space, drop
/// control characters and trim.
pub fn normalize_text(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| if c == '\u{00a0}' { ' ' } else { c })
        .filter(|c| c.is_whitespace() || !c.is_control())
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
