//! passagedb-embed
//!
//! Query embedders. The production embedding model lives outside this
//! workspace; `HashingEmbedder` is a deterministic stand-in for development
//! and tests.

use anyhow::Result;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use twox_hash::XxHash64;

use passagedb_core::config::{EmbeddingProvider, EmbeddingSettings};
use passagedb_core::traits::Embedder;

/// Feature-hashing embedder: each whitespace token bumps one bucket, then
/// the vector is L2-normalized.
#[derive(Debug, Clone)]
pub struct HashingEmbedder { dim: usize }

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim: dim.max(1) } }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v { *x /= norm; }
        v
    }
}

impl Embedder for HashingEmbedder {
    fn dim(&self) -> usize { self.dim }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> { Ok(texts.iter().map(|t| self.embed_text(t)).collect()) }
}

/// Embedder selected by configuration, or `None` when dense queries must
/// arrive as vectors.
pub fn embedder_from_settings(settings: &EmbeddingSettings) -> Option<Arc<dyn Embedder>> {
    match settings.provider {
        EmbeddingProvider::Hashing => {
            tracing::info!(dim = settings.dimension, "using hashing embedder");
            Some(Arc::new(HashingEmbedder::new(settings.dimension)))
        }
        EmbeddingProvider::None => None,
    }
}
