use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use passagedb_core::config::Bm25Settings;
use passagedb_core::error::{Error, Result};
use passagedb_core::ranking::top_k_hits;
use passagedb_core::types::{SearchHit, SourceKind};
use passagedb_core::PassageStore;

use crate::artifact::{read_token_sequences, tokenize_store};
use crate::tokenize::PassageTokenizer;

/// BM25 free parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
	pub k1: f32,
	pub b: f32,
}

impl Default for Bm25Params {
	fn default() -> Self { Self { k1: 1.5, b: 0.75 } }
}

impl From<Bm25Settings> for Bm25Params {
	fn from(s: Bm25Settings) -> Self { Self { k1: s.k1, b: s.b } }
}

/// In-memory BM25 index over per-passage token sequences.
///
/// Postings hold `(row, term frequency)` per term; document frequency is the
/// postings length. Rows follow passage load order.
#[derive(Debug, Clone)]
pub struct Bm25Index {
	tokenizer: PassageTokenizer,
	params: Bm25Params,
	postings: HashMap<String, Vec<(usize, u32)>>,
	doc_lens: Vec<u32>,
	avg_len: f32,
}

impl Bm25Index {
	pub fn build(token_sequences: &[Vec<String>], tokenizer: PassageTokenizer, params: Bm25Params) -> Self {
		let mut postings: HashMap<String, Vec<(usize, u32)>> = HashMap::new();
		let mut doc_lens = Vec::with_capacity(token_sequences.len());
		for (row, tokens) in token_sequences.iter().enumerate() {
			doc_lens.push(u32::try_from(tokens.len()).unwrap_or(u32::MAX));
			let mut tf: HashMap<&str, u32> = HashMap::new();
			for t in tokens { *tf.entry(t.as_str()).or_insert(0) += 1; }
			for (term, freq) in tf { postings.entry(term.to_string()).or_default().push((row, freq)); }
		}
		let total: u64 = doc_lens.iter().map(|&l| u64::from(l)).sum();
		let avg_len = if doc_lens.is_empty() { 0.0 } else { total as f32 / doc_lens.len() as f32 };
		Self { tokenizer, params, postings, doc_lens, avg_len }
	}

	/// Tokenize every passage of `store` and build.
	pub fn from_store(store: &PassageStore, tokenizer: PassageTokenizer, params: Bm25Params) -> Self {
		let sequences = tokenize_store(store, &tokenizer);
		Self::build(&sequences, tokenizer, params)
	}

	/// Build from the persisted lexical artifact, which must hold exactly one
	/// token sequence per passage.
	pub fn load(tokens_path: &Path, passage_count: usize, tokenizer: PassageTokenizer, params: Bm25Params) -> Result<Self> {
		let started = Instant::now();
		let sequences = read_token_sequences(tokens_path)?;
		if sequences.len() != passage_count {
			return Err(Error::DimensionMismatch(format!(
				"{} holds {} token sequences but the corpus has {} passages",
				tokens_path.display(), sequences.len(), passage_count
			)));
		}
		let index = Self::build(&sequences, tokenizer, params);
		tracing::info!(path = %tokens_path.display(), passages = index.len(), terms = index.postings.len(), avg_len = index.avg_len, elapsed_ms = started.elapsed().as_millis() as u64, "built lexical index");
		Ok(index)
	}

	pub fn len(&self) -> usize { self.doc_lens.len() }

	pub fn is_empty(&self) -> bool { self.doc_lens.is_empty() }

	pub fn avg_len(&self) -> f32 { self.avg_len }

	pub fn params(&self) -> Bm25Params { self.params }

	pub fn tokenizer(&self) -> &PassageTokenizer { &self.tokenizer }

	/// Number of passages containing `term` (already tokenized form).
	pub fn doc_freq(&self, term: &str) -> usize { self.postings.get(term).map_or(0, Vec::len) }

	fn idf(&self, df: usize) -> f32 {
		let n = self.len() as f32;
		let df = df as f32;
		(1.0 + (n - df + 0.5) / (df + 0.5)).ln()
	}

	/// BM25 score of every passage, in row order. Repeated query terms count
	/// once per occurrence; unknown terms add nothing.
	pub fn scores(&self, query: &str) -> Vec<f32> {
		let mut scores = vec![0.0f32; self.len()];
		let Bm25Params { k1, b } = self.params;
		for term in self.tokenizer.tokenize(query) {
			let Some(list) = self.postings.get(&term) else { continue };
			let idf = self.idf(list.len());
			for &(row, tf) in list {
				let tf = tf as f32;
				let len_ratio = if self.avg_len > 0.0 { self.doc_lens[row] as f32 / self.avg_len } else { 0.0 };
				let norm = k1 * (1.0 - b + b * len_ratio);
				scores[row] += idf * tf * (k1 + 1.0) / (tf + norm);
			}
		}
		scores
	}

	/// Rank all passages against `query`; passages sharing no term score zero
	/// and still fill the result when fewer than `top_k` match.
	pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
		if query.trim().is_empty() { return Err(Error::EmptyQuery); }
		let hits = top_k_hits(&self.scores(query), top_k, SourceKind::Lexical);
		tracing::debug!(top_k, hits = hits.len(), "lexical search");
		Ok(hits)
	}
}
