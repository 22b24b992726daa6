use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::GenerationProvider;
use crate::error::{VectorError, VectorResult};
use crate::openai::{OpenAIConfig, error_for_status};

/// OpenAI chat completions provider (`POST {base}/chat/completions`)
pub struct OpenAIChatProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIChatProvider {
    pub fn new(config: OpenAIConfig) -> VectorResult<Self> {
        Ok(Self {
            client: config.http_client()?,
            config,
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatContent,
}

#[derive(Debug, Deserialize)]
struct ChatContent {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl GenerationProvider for OpenAIChatProvider {
    #[instrument(skip_all, fields(model = %self.config.chat_model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> VectorResult<String> {
        let request = ChatRequest {
            model: &self.config.chat_model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;
        let response = error_for_status(response, "Chat completions").await?;

        let content = response
            .json::<ChatResponse>()
            .await?
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| VectorError::Upstream("No completion returned".to_string()))?;

        debug!(response_len = content.len(), "Completion received");
        Ok(content)
    }
}
