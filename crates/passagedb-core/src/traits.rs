/// External embedding function used to turn a dense query into a vector.
///
/// Implementations must return one vector of length `dim()` per input text.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}
