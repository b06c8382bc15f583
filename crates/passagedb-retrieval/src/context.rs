use serde::Serialize;

use passagedb_core::types::RetrievedPassage;

/// Placed between consecutive blocks. Each block already ends in a newline,
/// so blocks are separated by one blank line.
pub const BLOCK_SEPARATOR: &str = "\n";

/// Model-ready context plus the ranked list it was built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextBlock {
    pub text: String,
    /// Leading passages of `passages` that made it into `text`.
    pub included: usize,
    pub passages: Vec<RetrievedPassage>,
}

/// `[Source: <name>, page <n>]`, or `[Source: <name>]` when the page is 0.
pub fn provenance(passage: &RetrievedPassage) -> String {
    match passage.page {
        0 => format!("[Source: {}]", passage.source_name()),
        page => format!("[Source: {}, page {}]", passage.source_name(), page),
    }
}

pub fn render_block(passage: &RetrievedPassage) -> String { format!("{}\n{}\n", provenance(passage), passage.text.trim()) }

/// Concatenate blocks in rank order until the next one would push the total
/// past `max_chars` (counted in chars, separators included). Blocks are never
/// split; the first block that does not fit ends the context.
pub fn assemble(ranked: &[RetrievedPassage], max_chars: usize) -> String { pack(ranked, max_chars).0 }

fn pack(ranked: &[RetrievedPassage], max_chars: usize) -> (String, usize) {
    let sep_len = BLOCK_SEPARATOR.chars().count();
    let mut out = String::new();
    let mut total = 0usize;
    let mut included = 0usize;
    for passage in ranked {
        let block = render_block(passage);
        let needed = block.chars().count() + if included > 0 { sep_len } else { 0 };
        if total + needed > max_chars {
            break;
        }
        if included > 0 {
            out.push_str(BLOCK_SEPARATOR);
        }
        out.push_str(&block);
        total += needed;
        included += 1;
    }
    (out, included)
}

pub fn build_context(ranked: Vec<RetrievedPassage>, max_chars: usize) -> ContextBlock {
    let (text, included) = pack(&ranked, max_chars);
    tracing::debug!(ranked = ranked.len(), included, chars = text.chars().count(), max_chars, "assembled context");
    ContextBlock { text, included, passages: ranked }
}
