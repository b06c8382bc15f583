use serde::Serialize;
use std::fmt::Display;

use passagedb_core::types::RetrievedPassage;

use crate::context::provenance;

pub const FALLBACK_HEADER: &str = "LLM is not configured. Here are the most relevant sources:";

/// Characters of passage text quoted per source in a digest.
pub const EXCERPT_CHARS: usize = 400;

/// What the caller gets back after the answer step: either the model's text,
/// or, when no model answered, a digest of the retrieved sources.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnswerOutcome {
    Generated { answer: String, sources: Vec<RetrievedPassage> },
    SourcesOnly { reason: String, digest: String, sources: Vec<RetrievedPassage> },
}

impl AnswerOutcome {
    pub fn from_model<E: Display>(result: std::result::Result<String, E>, sources: Vec<RetrievedPassage>) -> Self {
        match result {
            Ok(answer) => Self::Generated { answer, sources },
            Err(e) => {
                tracing::warn!(error = %e, sources = sources.len(), "answer model unavailable; returning sources");
                let digest = render_sources_digest(FALLBACK_HEADER, &sources);
                Self::SourcesOnly { reason: e.to_string(), digest, sources }
            }
        }
    }

    /// Text to show the user.
    pub fn text(&self) -> &str {
        match self {
            Self::Generated { answer, .. } => answer,
            Self::SourcesOnly { digest, .. } => digest,
        }
    }

    pub fn sources(&self) -> &[RetrievedPassage] {
        match self {
            Self::Generated { sources, .. } | Self::SourcesOnly { sources, .. } => sources,
        }
    }

    pub fn is_generated(&self) -> bool { matches!(self, Self::Generated { .. }) }
}

/// `header`, a blank line, then one `[Source: …] excerpt` line per source.
pub fn render_sources_digest(header: &str, sources: &[RetrievedPassage]) -> String {
    let mut lines = vec![header.to_string(), String::new()];
    for s in sources {
        let excerpt: String = s.text.trim().chars().take(EXCERPT_CHARS).collect();
        lines.push(format!("{} {}", provenance(s), excerpt));
    }
    lines.join("\n")
}
