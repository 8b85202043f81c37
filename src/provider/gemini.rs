//! Gemini `generateContent` client. Structured output is requested through
//! `responseMimeType` + `responseSchema`.

use crate::error::ApiError;
use crate::provider::{build_provider_http_client, error_for_response, map_http_error, GenerationService};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiClient {
    client: Client,
    model: String,
    api_key: String,
    base_url: String,
    temperature: Option<f32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GeminiClient {
    pub fn new(
        model: String,
        api_key: String,
        base_url: Option<String>,
        temperature: Option<f32>,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            client: build_provider_http_client()?,
            model,
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            temperature,
        })
    }

    async fn generate(&self, prompt: &str, schema: Option<&Value>) -> Result<String, ApiError> {
        let mut generation_config = json!({});
        if let Some(temperature) = self.temperature {
            generation_config["temperature"] = json!(temperature);
        }
        if let Some(schema) = schema {
            generation_config["responseMimeType"] = json!("application/json");
            generation_config["responseSchema"] = to_gemini_schema(schema);
        }
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": generation_config,
        });

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        debug!(model = %self.model, structured = schema.is_some(), "Sending Gemini request");
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_http_error)?;

        if !response.status().is_success() {
            return Err(error_for_response(response).await);
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ApiError::ProviderError(format!("Failed to parse response: {}", e)))?;
        extract_text(parsed)
    }
}

fn extract_text(response: GenerateContentResponse) -> Result<String, ApiError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ApiError::ProviderError(format!("Prompt blocked: {}", reason)));
    }
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::ProviderError("No candidates in response".to_string()))?;
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.is_empty() {
        return Err(ApiError::ProviderError(format!(
            "Empty candidate (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }
    Ok(text)
}

/// Gemini's schema dialect spells types in upper case.
fn to_gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| {
                    let converted = match (key.as_str(), value) {
                        ("type", Value::String(t)) => Value::String(t.to_ascii_uppercase()),
                        _ => to_gemini_schema(value),
                    };
                    (key.clone(), converted)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(to_gemini_schema).collect()),
        other => other.clone(),
    }
}

#[async_trait]
impl GenerationService for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, ApiError> {
        self.generate(prompt, None).await
    }

    async fn generate_structured(&self, prompt: &str, schema: &Value) -> Result<String, ApiError> {
        self.generate(prompt, Some(schema)).await
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
