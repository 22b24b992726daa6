use async_trait::async_trait;

use crate::error::VectorResult;

/// Prompt in, generated text out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    async fn generate(&self, prompt: &str) -> VectorResult<String>;
}
