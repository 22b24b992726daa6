use async_trait::async_trait;

use crate::error::VectorResult;

/// Turns text into fixed-dimension vectors.
///
/// Failures (transport, non-2xx, timeout, malformed body) are `Upstream`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> VectorResult<Vec<f32>>;

    /// One vector per input, in input order.
    async fn embed_batch(&self, texts: &[String]) -> VectorResult<Vec<Vec<f32>>>;
}
