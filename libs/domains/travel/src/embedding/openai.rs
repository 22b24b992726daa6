use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::EmbeddingProvider;
use crate::error::{VectorError, VectorResult};
use crate::openai::{OpenAIConfig, error_for_status};

/// OpenAI embeddings provider (`POST {base}/embeddings`)
pub struct OpenAIEmbeddingProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIEmbeddingProvider {
    pub fn new(config: OpenAIConfig) -> VectorResult<Self> {
        Ok(Self {
            client: config.http_client()?,
            config,
        })
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[async_trait]
impl EmbeddingProvider for OpenAIEmbeddingProvider {
    async fn embed(&self, text: &str) -> VectorResult<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| VectorError::Upstream("No embedding returned".to_string()))
    }

    #[instrument(skip_all, fields(model = %self.config.embedding_model, count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> VectorResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let request = EmbeddingRequest {
            model: &self.config.embedding_model,
            input: texts,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;
        let response = error_for_status(response, "Embeddings").await?;

        let mut data = response.json::<EmbeddingResponse>().await?.data;
        if data.len() != texts.len() {
            return Err(VectorError::Upstream(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                data.len()
            )));
        }

        // Sort by index to maintain order
        data.sort_by_key(|d| d.index);
        debug!("Embeddings received");

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}
