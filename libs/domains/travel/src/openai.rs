//! Configuration shared by the OpenAI-compatible embedding and chat adapters.

use core_config::{env_or_default, env_parse_or_default, env_required};
use reqwest::{Client, Response};
use std::time::Duration;

use crate::error::{VectorError, VectorResult};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI-compatible API configuration
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub embedding_model: String,
    pub chat_model: String,
    pub timeout_secs: u64,
}

impl OpenAIConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
            timeout_secs: 60,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn from_env() -> VectorResult<Self> {
        let api_key = env_required("OPENAI_API_KEY")?;
        let defaults = Self::new(api_key);

        Ok(Self {
            base_url: env_or_default("OPENAI_BASE_URL", &defaults.base_url)
                .trim_end_matches('/')
                .to_string(),
            embedding_model: env_or_default("OPENAI_EMBEDDING_MODEL", &defaults.embedding_model),
            chat_model: env_or_default("OPENAI_CHAT_MODEL", &defaults.chat_model),
            timeout_secs: env_parse_or_default("OPENAI_TIMEOUT_SECS", defaults.timeout_secs)?,
            ..defaults
        })
    }

    /// Pooled client with the configured request timeout.
    pub(crate) fn http_client(&self) -> VectorResult<Client> {
        Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| VectorError::Config(format!("Failed to build HTTP client: {}", e)))
    }
}

/// Turns a non-2xx response into `Upstream` carrying status and body.
pub(crate) async fn error_for_status(response: Response, api: &str) -> VectorResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();
    Err(VectorError::Upstream(format!(
        "{} API error ({}): {}",
        api, status, error_text
    )))
}
