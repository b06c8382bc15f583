use passagedb_core::config::Strategy;
use passagedb_core::error::{Error, Result};
use passagedb_core::types::SearchHit;
use passagedb_text::Bm25Index;
use passagedb_vector::DenseIndex;

/// A query as received from the transport layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Query<'a> {
    Text(&'a str),
    Vector(&'a [f32]),
}

impl<'a> Query<'a> {
    /// Empty or whitespace-only text and zero-length vectors are rejected
    /// before any scoring.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Text(t) if t.trim().is_empty() => Err(Error::EmptyQuery),
            Self::Vector(v) if v.is_empty() => Err(Error::EmptyQuery),
            _ => Ok(()),
        }
    }
}

impl<'a> From<&'a str> for Query<'a> {
    fn from(text: &'a str) -> Self { Self::Text(text) }
}

impl<'a> From<&'a [f32]> for Query<'a> {
    fn from(vector: &'a [f32]) -> Self { Self::Vector(vector) }
}

/// The ranking strategy of one generation, chosen at load time.
#[derive(Debug, Clone)]
pub enum Retriever {
    Dense(DenseIndex),
    Lexical(Bm25Index),
}

impl Retriever {
    pub fn strategy(&self) -> Strategy {
        match self {
            Self::Dense(_) => Strategy::Dense,
            Self::Lexical(_) => Strategy::Lexical,
        }
    }

    /// Number of indexed rows.
    pub fn len(&self) -> usize {
        match self {
            Self::Dense(index) => index.len(),
            Self::Lexical(index) => index.len(),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Top-`top_k` hits for `query`. Non-positive `top_k` yields nothing;
    /// values beyond the corpus size are clamped.
    pub fn search(&self, query: Query<'_>, top_k: i64) -> Result<Vec<SearchHit>> {
        query.validate()?;
        let k = clamp_top_k(top_k);
        match (self, query) {
            (Self::Dense(index), Query::Vector(v)) => index.search(v, k),
            (Self::Lexical(index), Query::Text(t)) => index.search(t, k),
            (Self::Dense(_), Query::Text(_)) => Err(Error::UnsupportedQuery("dense retrieval needs a query vector; embed the text first".into())),
            (Self::Lexical(_), Query::Vector(_)) => Err(Error::UnsupportedQuery("lexical retrieval needs query text".into())),
        }
    }
}

pub fn clamp_top_k(top_k: i64) -> usize { usize::try_from(top_k).unwrap_or(0) }
