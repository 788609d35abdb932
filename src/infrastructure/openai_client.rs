//! Chat completion client for the text generation service
//!
//! A minimal REST client: one endpoint, bearer auth, error bodies preserved
//! so callers can classify authentication and rate-limit failures.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::infrastructure::config::EnrichmentConfig;

/// Generation service failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// Missing API key or invalid client settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection failed or timed out
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response; `message` carries the response body
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Unexpected response shape
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No completion returned")]
    EmptyResponse,
}

/// Fixed sampling parameters for one completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl SamplingParams {
    pub fn from_config(config: &EnrichmentConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self::from_config(&EnrichmentConfig::default())
    }
}

/// Produces text for a prompt
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str, params: &SamplingParams) -> Result<String, GenerationError>;
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion request body
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ChatRequest {
    pub fn single_prompt(prompt: &str, params: &SamplingParams) -> Self {
        Self {
            model: params.model.clone(),
            messages: vec![Message::user(prompt)],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponseRaw {
    choices: Vec<ChoiceRaw>,
}

#[derive(Debug, Deserialize)]
struct ChoiceRaw {
    message: MessageRaw,
}

#[derive(Debug, Deserialize)]
struct MessageRaw {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completion client
#[derive(Clone)]
pub struct OpenAiClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: crate::infrastructure::config::defaults::OPENAI_BASE_URL.to_string(),
        }
    }

    /// Build from enrichment settings; fails when no key is configured
    pub fn from_config(config: &EnrichmentConfig) -> Result<Self, GenerationError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| GenerationError::Config("OPENAI_API_KEY not set".into()))?;

        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| GenerationError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            api_key: api_key.to_string(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Set a custom base URL (for proxies or compatible services)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn chat_completion(&self, request: &ChatRequest) -> Result<String, GenerationError> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Chat completion request failed");
                GenerationError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Chat completion API error");
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let raw: ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| GenerationError::Parse(e.to_string()))?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            "Chat completion"
        );

        raw.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(GenerationError::EmptyResponse)
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn complete(&self, prompt: &str, params: &SamplingParams) -> Result<String, GenerationError> {
        self.chat_completion(&ChatRequest::single_prompt(prompt, params)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = OpenAiClient::new("sk-test").with_base_url("https://custom.api.com");
        assert_eq!(client.api_key, "sk-test");
        assert_eq!(client.base_url(), "https://custom.api.com");
    }

    #[test]
    fn from_config_requires_key() {
        let config = EnrichmentConfig::default();
        assert!(matches!(OpenAiClient::from_config(&config), Err(GenerationError::Config(_))));
    }

    #[test]
    fn from_config_trims_base_url() {
        let config = EnrichmentConfig {
            api_key: Some("sk-test".to_string()),
            api_base_url: "http://localhost:8080/v1/".to_string(),
            ..EnrichmentConfig::default()
        };
        let client = OpenAiClient::from_config(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/v1");
    }

    #[test]
    fn request_body_carries_sampling_params() {
        let request = ChatRequest::single_prompt("hello", &SamplingParams::default());
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["model"], "gpt-3.5-turbo");
        assert_eq!(body["max_tokens"], 150);
        assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "hello");
    }

    #[test]
    fn response_without_content_is_empty() {
        let raw: ChatResponseRaw =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant"}}]}"#).unwrap();
        assert!(raw.choices[0].message.content.is_none());
    }
}
