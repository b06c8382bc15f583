use std::path::Path;
use std::sync::Arc;

use passagedb_core::config::{RetrievalSettings, Settings, Strategy};
use passagedb_core::error::{Error, Result};
use passagedb_core::traits::Embedder;
use passagedb_core::types::RetrievedPassage;
use passagedb_embed::embedder_from_settings;

use crate::context::{build_context, ContextBlock};
use crate::generation::{Generation, GenerationInfo, GenerationLoader, IndexHandle};
use crate::retriever::Query;

/// Retrieval entry point for transports: owns the generation handle, the
/// loader used on reload and the optional query embedder.
pub struct RetrievalService {
    handle: IndexHandle,
    loader: GenerationLoader,
    embedder: Option<Arc<dyn Embedder>>,
    defaults: RetrievalSettings,
}

impl RetrievalService {
    /// A service with nothing loaded yet; call [`reload`](Self::reload).
    pub fn new(loader: GenerationLoader, embedder: Option<Arc<dyn Embedder>>, defaults: RetrievalSettings) -> Self {
        Self { handle: IndexHandle::new(), loader, embedder, defaults }
    }

    pub fn from_settings(settings: &Settings, base: &Path) -> Self {
        let loader = GenerationLoader::from_settings(settings, base);
        let embedder = match settings.index.strategy {
            Strategy::Dense => embedder_from_settings(&settings.embedding),
            Strategy::Lexical => None,
        };
        Self::new(loader, embedder, settings.retrieval.clone())
    }

    pub fn reload(&self) -> Result<GenerationInfo> { self.handle.reload(&self.loader) }

    pub fn status(&self) -> Option<GenerationInfo> { self.handle.status() }

    /// Rank passages for `query` against the current generation. Text queries
    /// to a dense generation are embedded first.
    pub fn retrieve(&self, query: Query<'_>, top_k: i64) -> Result<Vec<RetrievedPassage>> {
        query.validate()?;
        let generation = self.handle.current()?;
        let results = match (generation.strategy(), query) {
            (Strategy::Dense, Query::Text(text)) => {
                let vector = self.embed_query(text)?;
                generation.search(Query::Vector(&vector), top_k)?
            }
            _ => generation.search(query, top_k)?,
        };
        tracing::debug!(generation = generation.id(), strategy = %generation.strategy(), top_k, hits = results.len(), "retrieve");
        Ok(results)
    }

    pub fn build_context(&self, ranked: Vec<RetrievedPassage>, max_chars: usize) -> ContextBlock { build_context(ranked, max_chars) }

    /// Retrieve then assemble, falling back to configured defaults.
    pub fn retrieve_context(&self, query: Query<'_>, top_k: Option<i64>, max_chars: Option<usize>) -> Result<ContextBlock> {
        let top_k = top_k.unwrap_or_else(|| i64::try_from(self.defaults.top_k).unwrap_or(i64::MAX));
        let ranked = self.retrieve(query, top_k)?;
        Ok(build_context(ranked, max_chars.unwrap_or(self.defaults.max_context_chars)))
    }

    /// The generation currently serving, for callers that need several reads
    /// against one snapshot.
    pub fn current(&self) -> Result<Arc<Generation>> { self.handle.current() }

    fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let Some(embedder) = &self.embedder else {
            return Err(Error::UnsupportedQuery("dense retrieval without an embedder needs a query vector".into()));
        };
        embedder
            .embed_batch(&[text.to_string()])
            .map_err(|e| Error::Embedding(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("embedder returned no vector".into()))
    }
}
