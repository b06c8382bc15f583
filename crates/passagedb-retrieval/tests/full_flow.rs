use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::thread;

use candle_core::{Device, Tensor};
use tempfile::TempDir;

use passagedb_core::artifacts::ArtifactLayout;
use passagedb_core::config::{EmbeddingProvider, Settings, Strategy};
use passagedb_core::error::Error;
use passagedb_core::types::Passage;
use passagedb_core::PassageStore;
use passagedb_embed::HashingEmbedder;
use passagedb_retrieval::{Generation, GenerationLoader, IndexHandle, Query, RetrievalService, Retriever};
use passagedb_text::artifact::{tokenize_store, write_token_sequences};
use passagedb_text::{Bm25Index, Bm25Params, PassageTokenizer};

const DIM: usize = 64;

fn circuits() -> Vec<Passage> {
    vec![
        passage("ohm-law", "Ohm's law relates voltage current and resistance", "/pdfs/a.pdf", 1),
        passage("cap", "A capacitor stores charge measured in farads", "/pdfs/b.pdf", 2),
        passage("series", "Series resistors add their resistance values", "/pdfs/c.pdf", 0),
    ]
}

fn radios() -> Vec<Passage> {
    vec![
        passage("ant", "A dipole antenna has resistance at resonance", "/pdfs/r.pdf", 4),
        passage("band", "The two meter band is popular for local nets", "/pdfs/r.pdf", 5),
        passage("swr", "High SWR means reflected power and lost resistance match", "/pdfs/r.pdf", 6),
        passage("qsl", "QSL cards confirm a contact", "/pdfs/q.pdf", 1),
    ]
}

fn passage(id: &str, text: &str, source: &str, page: u32) -> Passage {
    Passage { id: id.into(), text: text.into(), source: source.into(), page, title: String::new() }
}

// Writes all three artifacts for `passages` into `dir`.
fn write_index(dir: &Path, passages: &[Passage]) {
    let layout = ArtifactLayout::new(dir);
    let lines: Vec<String> = passages.iter().map(|p| serde_json::to_string(p).unwrap()).collect();
    fs::write(layout.metadata(), lines.join("\n") + "\n").unwrap();

    let store = PassageStore::load(&layout.metadata()).unwrap();
    write_token_sequences(&layout.lexical_tokens(), &tokenize_store(&store, &PassageTokenizer::new().unwrap())).unwrap();

    let embedder = HashingEmbedder::new(DIM);
    let flat: Vec<f32> = store.iter().flat_map(|p| embedder.embed_text(&p.text)).collect();
    Tensor::from_vec(flat, (store.len(), DIM), &Device::Cpu).unwrap().write_npy(layout.embeddings()).unwrap();
}

fn settings(dir: &Path, strategy: Strategy) -> Settings {
    let mut s = Settings::default();
    s.index.dir = dir.display().to_string();
    s.index.strategy = strategy;
    s.embedding.dimension = DIM;
    s
}

fn ids(results: &[passagedb_core::RetrievedPassage]) -> Vec<&str> { results.iter().map(|r| r.id.as_str()).collect() }

#[test]
fn lexical_service_ranks_and_fills_with_zero_scores() {
    let tmp = TempDir::new().unwrap();
    write_index(tmp.path(), &circuits());
    let service = RetrievalService::from_settings(&settings(tmp.path(), Strategy::Lexical), tmp.path());
    let info = service.reload().expect("reload");
    assert_eq!(info.generation, 1);
    assert_eq!(info.strategy, Strategy::Lexical);
    assert_eq!(info.passages, 3);

    // shorter passage wins among equal term frequencies
    let results = service.retrieve(Query::Text("resistance"), 3).unwrap();
    assert_eq!(ids(&results), vec!["series", "ohm-law", "cap"]);
    assert!(results[0].score > results[1].score && results[1].score > 0.0);
    assert_eq!(results[2].score, 0.0);
    assert_eq!(results[0].source, "/pdfs/c.pdf");
    assert_eq!(results[0].page, 0);

    let none = service.retrieve(Query::Text("inductor"), 10).unwrap();
    assert_eq!(ids(&none), vec!["ohm-law", "cap", "series"], "no match keeps row order");
    assert!(none.iter().all(|r| r.score == 0.0));
}

#[test]
fn non_positive_top_k_returns_nothing() {
    let tmp = TempDir::new().unwrap();
    write_index(tmp.path(), &circuits());
    for strategy in [Strategy::Lexical, Strategy::Dense] {
        let service = RetrievalService::from_settings(&settings(tmp.path(), strategy), tmp.path());
        service.reload().unwrap();
        assert!(service.retrieve(Query::Text("resistance"), 0).unwrap().is_empty());
        assert!(service.retrieve(Query::Text("resistance"), -4).unwrap().is_empty());
        assert_eq!(service.retrieve(Query::Text("resistance"), 50).unwrap().len(), 3);
    }
}

#[test]
fn query_errors() {
    let tmp = TempDir::new().unwrap();
    write_index(tmp.path(), &circuits());

    let lexical = RetrievalService::from_settings(&settings(tmp.path(), Strategy::Lexical), tmp.path());
    assert!(matches!(lexical.retrieve(Query::Text("ohm"), 3), Err(Error::IndexUnavailable)));
    lexical.reload().unwrap();
    assert!(matches!(lexical.retrieve(Query::Text("   "), 3), Err(Error::EmptyQuery)));
    assert!(matches!(lexical.retrieve(Query::Vector(&[1.0; DIM]), 3), Err(Error::UnsupportedQuery(_))));

    let dense = RetrievalService::from_settings(&settings(tmp.path(), Strategy::Dense), tmp.path());
    dense.reload().unwrap();
    assert!(matches!(dense.retrieve(Query::Vector(&[]), 3), Err(Error::EmptyQuery)));
    assert!(matches!(dense.retrieve(Query::Vector(&[1.0, 2.0]), 3), Err(Error::DimensionMismatch(_))));

    let mut no_embedder = settings(tmp.path(), Strategy::Dense);
    no_embedder.embedding.provider = EmbeddingProvider::None;
    let vectors_only = RetrievalService::from_settings(&no_embedder, tmp.path());
    vectors_only.reload().unwrap();
    assert!(matches!(vectors_only.retrieve(Query::Text("farads"), 3), Err(Error::UnsupportedQuery(_))));
    assert_eq!(vectors_only.retrieve(Query::Vector(&[0.5; DIM]), 2).unwrap().len(), 2);
}

#[test]
fn dense_service_embeds_text_queries() {
    let tmp = TempDir::new().unwrap();
    write_index(tmp.path(), &circuits());
    let service = RetrievalService::from_settings(&settings(tmp.path(), Strategy::Dense), tmp.path());
    assert_eq!(service.reload().unwrap().strategy, Strategy::Dense);

    let results = service.retrieve(Query::Text("A capacitor stores charge measured in farads"), 1).unwrap();
    assert_eq!(ids(&results), vec!["cap"]);
    assert!((results[0].score - 1.0).abs() < 1e-4);

    let v = HashingEmbedder::new(DIM).embed_text("Series resistors add their resistance values");
    let by_vector = service.retrieve(Query::Vector(&v), 3).unwrap();
    assert_eq!(by_vector[0].id, "series");
    assert!(by_vector.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn retrieve_context_uses_configured_defaults() {
    let tmp = TempDir::new().unwrap();
    write_index(tmp.path(), &circuits());
    let mut s = settings(tmp.path(), Strategy::Lexical);
    s.retrieval.top_k = 2;
    let service = RetrievalService::from_settings(&s, tmp.path());
    service.reload().unwrap();

    let block = service.retrieve_context(Query::Text("farads"), None, None).unwrap();
    assert_eq!(block.passages.len(), 2);
    assert_eq!(block.included, 2);
    assert!(block.text.starts_with("[Source: b.pdf, page 2]\nA capacitor stores charge measured in farads\n"));

    let tight = service.retrieve_context(Query::Text("farads"), Some(3), Some(10)).unwrap();
    assert!(tight.text.is_empty());
    assert_eq!(tight.passages.len(), 3);
}

#[test]
fn generation_rejects_mismatched_index() {
    let store = PassageStore::from_passages(circuits()).unwrap();
    let tokens = vec![vec!["ohm".to_string()]];
    let retriever = Retriever::Lexical(Bm25Index::build(&tokens, PassageTokenizer::new().unwrap(), Bm25Params::default()));
    assert!(matches!(Generation::new(store, retriever), Err(Error::DimensionMismatch(_))));
}

#[test]
fn failed_reload_keeps_serving_generation() {
    let tmp = TempDir::new().unwrap();
    let layout = ArtifactLayout::new(tmp.path());
    let loader = GenerationLoader::new(layout.clone(), Strategy::Lexical, Bm25Params::default());
    let handle = IndexHandle::new();

    assert!(matches!(handle.reload(&loader), Err(Error::CorpusMissing { .. })));
    assert!(handle.status().is_none());

    write_index(tmp.path(), &circuits());
    assert_eq!(handle.reload(&loader).unwrap().generation, 1);

    // token artifact for a different corpus size
    write_token_sequences(&layout.lexical_tokens(), &[vec!["ohm".to_string()]]).unwrap();
    assert!(matches!(handle.reload(&loader), Err(Error::DimensionMismatch(_))));

    fs::remove_file(layout.lexical_tokens()).unwrap();
    assert!(matches!(handle.reload(&loader), Err(Error::CorpusMissing { .. })));

    let status = handle.status().unwrap();
    assert_eq!(status.generation, 1);
    assert_eq!(status.passages, 3);
    assert_eq!(handle.current().unwrap().search(Query::Text("farads"), 1).unwrap()[0].id, "cap");
}

#[test]
fn held_snapshot_survives_swap() {
    let tmp = TempDir::new().unwrap();
    write_index(tmp.path(), &circuits());
    let service = RetrievalService::from_settings(&settings(tmp.path(), Strategy::Lexical), tmp.path());
    service.reload().unwrap();
    let old = service.current().unwrap();

    write_index(tmp.path(), &radios());
    assert_eq!(service.reload().unwrap().generation, 2);

    assert_eq!(old.id(), 1);
    assert_eq!(old.store().len(), 3);
    assert_eq!(old.search(Query::Text("farads"), 1).unwrap()[0].id, "cap");
    assert_eq!(service.retrieve(Query::Text("QSL"), 1).unwrap()[0].id, "qsl");
}

#[test]
fn concurrent_queries_see_exactly_one_generation() {
    let tmp = TempDir::new().unwrap();
    write_index(tmp.path(), &circuits());
    let service = RetrievalService::from_settings(&settings(tmp.path(), Strategy::Lexical), tmp.path());
    service.reload().unwrap();

    let first: HashSet<String> = circuits().into_iter().map(|p| p.id).collect();
    let second: HashSet<String> = radios().into_iter().map(|p| p.id).collect();
    let metadata = ArtifactLayout::new(tmp.path()).metadata();

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..200 {
                    let results = service.retrieve(Query::Text("resistance"), 3).expect("retrieve never fails mid-reload");
                    assert_eq!(results.len(), 3);
                    let from_first = results.iter().all(|r| first.contains(&r.id));
                    let from_second = results.iter().all(|r| second.contains(&r.id));
                    assert!(from_first ^ from_second, "mixed generations: {:?}", ids(&results));
                }
            });
        }

        fs::write(&metadata, "{ this is not json\n").unwrap();
        assert!(matches!(service.reload(), Err(Error::CorpusCorrupt { .. })));
        assert_eq!(service.status().unwrap().generation, 1);

        write_index(tmp.path(), &radios());
        let info = service.reload().unwrap();
        assert_eq!(info.generation, 2);
        assert_eq!(info.passages, 4);
    });

    let results = service.retrieve(Query::Text("resistance"), 2).unwrap();
    assert!(results.iter().all(|r| second.contains(&r.id)));
}
