use passagedb_core::config::{EmbeddingProvider, EmbeddingSettings};
use passagedb_core::traits::Embedder;
use passagedb_embed::{embedder_from_settings, HashingEmbedder};

#[test]
fn hashing_embedder_shapes_and_determinism() {
    let embedder = HashingEmbedder::new(64);
    let texts = vec!["series RLC circuit".to_string(), "series RLC circuit".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), 64);
    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");
    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[test]
fn empty_text_embeds_to_zero_vector() {
    let v = HashingEmbedder::new(8).embed_text("   ");
    assert!(v.iter().all(|x| *x == 0.0));
}

#[test]
fn provider_selection() {
    let hashing = EmbeddingSettings { provider: EmbeddingProvider::Hashing, dimension: 16 };
    assert_eq!(embedder_from_settings(&hashing).expect("embedder").dim(), 16);
    let none = EmbeddingSettings { provider: EmbeddingProvider::None, dimension: 16 };
    assert!(embedder_from_settings(&none).is_none());
}
