//! Top-K selection shared by the dense and lexical engines.

use std::cmp::Ordering;

use crate::types::{SearchHit, SourceKind};

/// Rank `scores` (one per passage, in load order) and keep the best `top_k`.
///
/// Ties keep load order. `top_k` larger than the corpus is clamped; zero
/// yields nothing. NaN scores sort last.
pub fn top_k_hits(scores: &[f32], top_k: usize, source: SourceKind) -> Vec<SearchHit> {
    let k = top_k.min(scores.len());
    if k == 0 {
        return Vec::new();
    }
    let mut order: Vec<usize> = (0..scores.len()).collect();
    // stable: equal keys keep ascending row order
    order.sort_by(|&a, &b| rank_key(scores[b]).partial_cmp(&rank_key(scores[a])).unwrap_or(Ordering::Equal));
    order.truncate(k);
    order.into_iter().map(|row| SearchHit { row, score: scores[row], source }).collect()
}

fn rank_key(score: f32) -> f32 {
    if score.is_nan() { f32::NEG_INFINITY } else { score }
}
