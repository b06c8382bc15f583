//! Loaded generations and the handle that swaps them.
//!
//! A generation pairs one passage store with the index built over it. Readers
//! take an `Arc` snapshot; reloads build the next generation off to the side
//! and replace the pointer in one step, so a failed reload leaves the
//! previous generation serving.

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use passagedb_core::artifacts::ArtifactLayout;
use passagedb_core::config::{Settings, Strategy};
use passagedb_core::error::{Error, Result};
use passagedb_core::types::RetrievedPassage;
use passagedb_core::PassageStore;
use passagedb_text::{Bm25Index, Bm25Params, PassageTokenizer};
use passagedb_vector::DenseIndex;

use crate::retriever::{Query, Retriever};

/// Snapshot metadata reported by status calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationInfo {
    pub generation: u64,
    pub strategy: Strategy,
    pub passages: usize,
    /// Seconds since the Unix epoch.
    pub loaded_at: u64,
}

#[derive(Debug)]
pub struct Generation {
    id: u64,
    store: PassageStore,
    retriever: Retriever,
    loaded_at: SystemTime,
}

impl Generation {
    /// Pair a store with its index. The id is assigned when the generation is
    /// published through an [`IndexHandle`].
    pub fn new(store: PassageStore, retriever: Retriever) -> Result<Self> {
        if store.len() != retriever.len() {
            return Err(Error::DimensionMismatch(format!("{} index rows for {} passages", retriever.len(), store.len())));
        }
        Ok(Self { id: 0, store, retriever, loaded_at: SystemTime::now() })
    }

    pub fn id(&self) -> u64 { self.id }

    pub fn store(&self) -> &PassageStore { &self.store }

    pub fn strategy(&self) -> Strategy { self.retriever.strategy() }

    /// Ranked passages for `query`, resolved against this generation's store.
    pub fn search(&self, query: Query<'_>, top_k: i64) -> Result<Vec<RetrievedPassage>> {
        let hits = self.retriever.search(query, top_k)?;
        Ok(hits
            .iter()
            .filter_map(|hit| self.store.get(hit.row).map(|p| RetrievedPassage::from_hit(p, hit)))
            .collect())
    }

    pub fn info(&self) -> GenerationInfo {
        GenerationInfo {
            generation: self.id,
            strategy: self.strategy(),
            passages: self.store.len(),
            loaded_at: self.loaded_at.duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs()),
        }
    }
}

/// Reads one generation's artifacts from an index directory.
#[derive(Debug, Clone)]
pub struct GenerationLoader {
    layout: ArtifactLayout,
    strategy: Strategy,
    bm25: Bm25Params,
}

impl GenerationLoader {
    pub fn new(layout: ArtifactLayout, strategy: Strategy, bm25: Bm25Params) -> Self { Self { layout, strategy, bm25 } }

    pub fn from_settings(settings: &Settings, base: &std::path::Path) -> Self {
        Self::new(ArtifactLayout::new(settings.index_dir(base)), settings.index.strategy, settings.bm25.into())
    }

    pub fn load(&self) -> Result<Generation> {
        let started = Instant::now();
        let store = PassageStore::load(&self.layout.metadata())?;
        let retriever = match self.strategy {
            Strategy::Dense => Retriever::Dense(DenseIndex::load(&self.layout.embeddings(), store.len())?),
            Strategy::Lexical => {
                Retriever::Lexical(Bm25Index::load(&self.layout.lexical_tokens(), store.len(), PassageTokenizer::new()?, self.bm25)?)
            }
        };
        let generation = Generation::new(store, retriever)?;
        tracing::info!(
            dir = %self.layout.dir().display(),
            strategy = %self.strategy,
            passages = generation.store.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "loaded generation"
        );
        Ok(generation)
    }
}

/// Holds the current generation. Cheap to read from many threads.
#[derive(Debug, Default)]
pub struct IndexHandle {
    current: RwLock<Option<Arc<Generation>>>,
    reload: Mutex<()>,
}

impl IndexHandle {
    pub fn new() -> Self { Self::default() }

    /// Snapshot of the serving generation. Holders keep it alive across a
    /// concurrent swap.
    pub fn current(&self) -> Result<Arc<Generation>> { self.current.read().clone().ok_or(Error::IndexUnavailable) }

    /// Publish a fully built generation, returning it with its assigned id.
    pub fn install(&self, mut generation: Generation) -> Arc<Generation> {
        let mut slot = self.current.write();
        generation.id = slot.as_ref().map_or(1, |g| g.id + 1);
        let generation = Arc::new(generation);
        *slot = Some(Arc::clone(&generation));
        generation
    }

    /// Build a new generation with `loader` and swap it in. On failure the
    /// serving generation is untouched and the error is returned.
    pub fn reload(&self, loader: &GenerationLoader) -> Result<GenerationInfo> {
        let _serialized = self.reload.lock();
        match loader.load() {
            Ok(generation) => {
                let published = self.install(generation);
                tracing::info!(generation = published.id, passages = published.store.len(), "generation swapped in");
                Ok(published.info())
            }
            Err(e) => {
                let serving = self.current.read().as_ref().map(|g| g.id);
                tracing::warn!(error = %e, serving = ?serving, "reload failed; keeping current generation");
                Err(e)
            }
        }
    }

    pub fn status(&self) -> Option<GenerationInfo> { self.current.read().as_ref().map(|g| g.info()) }
}
