use std::path::Path;
use std::time::Instant;

use candle_core::{DType, Device, Tensor};

use passagedb_core::artifacts::require_file;
use passagedb_core::error::{Error, Result};
use passagedb_core::ranking::top_k_hits;
use passagedb_core::types::{SearchHit, SourceKind};

/// Added to the query norm so a zero query never divides by zero.
pub const QUERY_EPSILON: f32 = 1e-9;

/// Row-normalized embedding matrix, one row per passage in load order.
///
/// Every row has unit L2 norm, except rows whose source vector was exactly
/// zero, which stay zero. Search is a full `O(n·d)` scan.
#[derive(Debug, Clone)]
pub struct DenseIndex {
	matrix: Option<Tensor>,
	rows: usize,
	dim: usize,
}

impl DenseIndex {
	/// Build from in-memory rows; `vectors.len()` must equal `passage_count`
	/// and every row must have the same length.
	pub fn build(vectors: &[Vec<f32>], passage_count: usize) -> Result<Self> {
		if vectors.len() != passage_count {
			return Err(Error::DimensionMismatch(format!("{} vectors for {} passages", vectors.len(), passage_count)));
		}
		let dim = vectors.first().map_or(0, Vec::len);
		if let Some((row, v)) = vectors.iter().enumerate().find(|(_, v)| v.len() != dim) {
			return Err(Error::DimensionMismatch(format!("row {} has {} components, expected {}", row, v.len(), dim)));
		}
		let flat: Vec<f32> = vectors.iter().flatten().copied().collect();
		let matrix = Tensor::from_vec(flat, (vectors.len(), dim), &Device::Cpu).map_err(shape_err)?;
		Self::from_tensor(&matrix, passage_count)
	}

	/// Build from a rank-2 tensor of any float dtype.
	pub fn from_tensor(matrix: &Tensor, passage_count: usize) -> Result<Self> {
		let (rows, dim) = matrix.dims2().map_err(shape_err)?;
		if rows != passage_count {
			return Err(Error::DimensionMismatch(format!("{} vector rows for {} passages", rows, passage_count)));
		}
		if rows > 0 && dim == 0 {
			return Err(Error::DimensionMismatch(format!("{} vector rows have no components", rows)));
		}
		if rows == 0 {
			return Ok(Self { matrix: None, rows, dim });
		}
		let matrix = normalize_rows(matrix).map_err(shape_err)?;
		Ok(Self { matrix: Some(matrix), rows, dim })
	}

	/// Load the `.npy` dense artifact and build against `passage_count` passages.
	pub fn load(path: &Path, passage_count: usize) -> Result<Self> {
		let started = Instant::now();
		require_file(path)?;
		let tensor = Tensor::read_npy(path).map_err(|e| Error::corrupt(path, format!("unreadable tensor: {e}")))?;
		if tensor.rank() != 2 {
			return Err(Error::corrupt(path, format!("expected a rank-2 matrix, found shape {:?}", tensor.dims())));
		}
		if !tensor.dtype().is_float() {
			return Err(Error::corrupt(path, format!("expected float rows, found {:?}", tensor.dtype())));
		}
		if tensor.dims()[0] > 0 && tensor.dims()[1] == 0 {
			return Err(Error::corrupt(path, format!("rows have no components, shape {:?}", tensor.dims())));
		}
		let index = Self::from_tensor(&tensor, passage_count)?;
		tracing::info!(path = %path.display(), rows = index.rows, dim = index.dim, elapsed_ms = started.elapsed().as_millis() as u64, "built dense index");
		Ok(index)
	}

	pub fn len(&self) -> usize { self.rows }

	pub fn is_empty(&self) -> bool { self.rows == 0 }

	pub fn dim(&self) -> usize { self.dim }

	/// Normalized row `i`, if present.
	pub fn row(&self, i: usize) -> Option<Vec<f32>> {
		if i >= self.rows { return None; }
		match &self.matrix {
			Some(m) => m.get(i).and_then(|r| r.to_vec1::<f32>()).ok(),
			None => Some(Vec::new()),
		}
	}

	/// Cosine similarity of `query` against every row, in row order.
	pub fn scores(&self, query: &[f32]) -> Result<Vec<f32>> {
		if query.is_empty() { return Err(Error::EmptyQuery); }
		// dim is 0 only for a corpus built from no vectors at all
		if self.dim > 0 && query.len() != self.dim {
			return Err(Error::DimensionMismatch(format!("query has {} components, index has {}", query.len(), self.dim)));
		}
		let Some(matrix) = &self.matrix else { return Ok(vec![0.0; self.rows]) };
		let norm = query.iter().map(|x| x * x).sum::<f32>().sqrt() + QUERY_EPSILON;
		let q: Vec<f32> = query.iter().map(|x| x / norm).collect();
		let q = Tensor::from_vec(q, (self.dim, 1), &Device::Cpu).map_err(shape_err)?;
		matrix.matmul(&q).and_then(|s| s.squeeze(1)).and_then(|s| s.to_vec1::<f32>()).map_err(shape_err)
	}

	pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>> {
		let hits = top_k_hits(&self.scores(query)?, top_k, SourceKind::Dense);
		tracing::debug!(top_k, hits = hits.len(), "dense search");
		Ok(hits)
	}
}

// Norms are taken in f64 after dividing each row by its largest magnitude.
// Zero rows stay zero.
fn normalize_rows(matrix: &Tensor) -> candle_core::Result<Tensor> {
	let m = matrix.to_dtype(DType::F64)?;
	let scaled = m.broadcast_div(&ones_where_zero(&m.abs()?.max_keepdim(1)?)?)?;
	let norms = scaled.sqr()?.sum_keepdim(1)?.sqrt()?;
	scaled.broadcast_div(&ones_where_zero(&norms)?)?.to_dtype(DType::F32)
}

fn ones_where_zero(t: &Tensor) -> candle_core::Result<Tensor> { t.eq(0f64)?.where_cond(&t.ones_like()?, t) }

fn shape_err(e: candle_core::Error) -> Error { Error::DimensionMismatch(e.to_string()) }
