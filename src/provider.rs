//! Model Provider Abstraction
//!
//! The remote text-generation service behind one trait. Clients know how to
//! send a free-form prompt and how to ask for structured JSON output; they do
//! not interpret the result.

use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub mod gemini;
pub mod openai;

pub use gemini::GeminiClient;
pub use openai::OpenAICompatibleClient;

/// Remote generation service.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Free-form prompt in, free-form text out.
    async fn generate_text(&self, prompt: &str) -> Result<String, ApiError>;

    /// Prompt plus a JSON Schema in; raw structured text out (not yet validated).
    async fn generate_structured(&self, prompt: &str, schema: &Value) -> Result<String, ApiError>;

    fn provider_name(&self) -> &str;

    fn model_name(&self) -> &str;
}

#[async_trait]
impl<S: GenerationService + ?Sized> GenerationService for Arc<S> {
    async fn generate_text(&self, prompt: &str) -> Result<String, ApiError> {
        (**self).generate_text(prompt).await
    }

    async fn generate_structured(&self, prompt: &str, schema: &Value) -> Result<String, ApiError> {
        (**self).generate_structured(prompt, schema).await
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Gemini,
    OpenAI,
    Ollama,
    Custom,
}

impl ProviderType {
    pub fn requires_api_key(self) -> bool {
        matches!(self, ProviderType::Gemini | ProviderType::OpenAI)
    }

    /// Provider-specific environment variable consulted when no key is configured.
    pub fn api_key_env_var(self) -> Option<&'static str> {
        match self {
            ProviderType::Gemini => Some("GEMINI_API_KEY"),
            ProviderType::OpenAI => Some("OPENAI_API_KEY"),
            ProviderType::Ollama | ProviderType::Custom => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub provider_type: ProviderType,
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL override; required for `custom`.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: ProviderType::Gemini,
            model: "gemini-2.5-flash".to_string(),
            api_key: None,
            endpoint: None,
            temperature: None,
        }
    }
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("Model name cannot be empty".to_string());
        }
        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(format!("Invalid endpoint URL: {}", endpoint));
            }
        }
        if self.provider_type == ProviderType::Custom && self.endpoint.is_none() {
            return Err("Custom providers require an endpoint".to_string());
        }
        if self.provider_type.requires_api_key() && self.resolved_api_key().is_none() {
            return Err(format!(
                "API key is required for {:?}; set api_key, ESSAYIST_API_KEY or {}",
                self.provider_type,
                self.provider_type.api_key_env_var().unwrap_or("the provider key variable")
            ));
        }
        Ok(())
    }

    /// Configured key, else `ESSAYIST_API_KEY`, else the provider-specific variable.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("ESSAYIST_API_KEY").ok())
            .or_else(|| {
                self.provider_type
                    .api_key_env_var()
                    .and_then(|var| std::env::var(var).ok())
            })
            .filter(|k| !k.trim().is_empty())
    }
}

pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_client(config: &ProviderConfig) -> Result<Arc<dyn GenerationService>, ApiError> {
        let api_key = config.resolved_api_key();
        let client: Arc<dyn GenerationService> = match config.provider_type {
            ProviderType::Gemini => Arc::new(GeminiClient::new(
                config.model.clone(),
                api_key.ok_or_else(|| {
                    ApiError::ConfigError("Gemini provider requires an API key".to_string())
                })?,
                config.endpoint.clone(),
                config.temperature,
            )?),
            ProviderType::OpenAI => Arc::new(OpenAICompatibleClient::new(
                "openai",
                config.model.clone(),
                api_key,
                config
                    .endpoint
                    .clone()
                    .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
                config.temperature,
            )?),
            ProviderType::Ollama => Arc::new(OpenAICompatibleClient::new(
                "ollama",
                config.model.clone(),
                None,
                config
                    .endpoint
                    .clone()
                    .unwrap_or_else(|| "http://localhost:11434/v1".to_string()),
                config.temperature,
            )?),
            ProviderType::Custom => Arc::new(OpenAICompatibleClient::new(
                "custom",
                config.model.clone(),
                api_key,
                config.endpoint.clone().ok_or_else(|| {
                    ApiError::ConfigError("Custom provider requires an endpoint".to_string())
                })?,
                config.temperature,
            )?),
        };
        Ok(client)
    }
}

// Helper function to map HTTP errors to ApiError
pub(crate) fn map_http_error(error: reqwest::Error) -> ApiError {
    if let Some(status) = error.status() {
        status_error(status.as_u16(), error.to_string())
    } else if error.is_timeout() {
        ApiError::ProviderRequestFailed(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        ApiError::ProviderRequestFailed(format!("Connection error: {}", error))
    } else {
        ApiError::ProviderError(format!("HTTP error: {}", error))
    }
}

pub(crate) fn status_error(status: u16, body: String) -> ApiError {
    match status {
        401 | 403 => ApiError::ProviderAuthFailed(format!("Authentication failed: {}", body)),
        429 => ApiError::ProviderRateLimit(format!("Rate limit exceeded: {}", body)),
        404 => ApiError::ProviderModelNotFound(format!("Model not found: {}", body)),
        _ => ApiError::ProviderRequestFailed(format!(
            "Request failed with status {}: {}",
            status, body
        )),
    }
}

/// Turn a non-success response into the matching provider error.
pub(crate) async fn error_for_response(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    status_error(status, body)
}

const PROVIDER_HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
// The generation client enforces the per-call deadline; this only catches stuck sockets.
const PROVIDER_HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

pub(crate) fn build_provider_http_client() -> Result<Client, ApiError> {
    Client::builder()
        .connect_timeout(PROVIDER_HTTP_CONNECT_TIMEOUT)
        .timeout(PROVIDER_HTTP_REQUEST_TIMEOUT)
        .build()
        .map_err(|e| ApiError::ProviderError(format!("Failed to create HTTP client: {}", e)))
}
