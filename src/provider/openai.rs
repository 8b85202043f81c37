//! OpenAI-compatible chat completions client (OpenAI, Ollama, local servers).
//! Structured output is requested through `response_format: json_schema`.

use crate::error::ApiError;
use crate::provider::{build_provider_http_client, error_for_response, map_http_error, GenerationService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

pub struct OpenAICompatibleClient {
    client: Client,
    provider_name: String,
    model: String,
    api_key: Option<String>,
    base_url: String,
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAICompatibleClient {
    pub fn new(
        provider_name: impl Into<String>,
        model: String,
        api_key: Option<String>,
        base_url: String,
        temperature: Option<f32>,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            client: build_provider_http_client()?,
            provider_name: provider_name.into(),
            model,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            temperature,
        })
    }

    async fn complete(&self, prompt: &str, schema: Option<&Value>) -> Result<String, ApiError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            response_format: schema.map(|schema| {
                json!({
                    "type": "json_schema",
                    "json_schema": {
                        "name": "essay_sections",
                        "schema": schema,
                    }
                })
            }),
            stream: false,
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!(
            provider = %self.provider_name,
            model = %self.model,
            structured = schema.is_some(),
            "Sending chat completion request"
        );
        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await.map_err(map_http_error)?;

        if !response.status().is_success() {
            return Err(error_for_response(response).await);
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ApiError::ProviderError(format!("Failed to parse response: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ApiError::ProviderError("No choices in response".to_string()))
    }
}

#[async_trait]
impl GenerationService for OpenAICompatibleClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, ApiError> {
        self.complete(prompt, None).await
    }

    async fn generate_structured(&self, prompt: &str, schema: &Value) -> Result<String, ApiError> {
        self.complete(prompt, Some(schema)).await
    }

    fn provider_name(&self) -> &str {
        &self.provider_name
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
