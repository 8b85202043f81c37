//! Generation Client
//!
//! Wraps the generation service for single-point and batch requests. Each call
//! runs under a local deadline; no retries happen here. Results are returned to
//! the caller and never written into the outline.

pub mod response;

pub use response::{parse_batch_response, BatchEntry};

use crate::error::ApiError;
use crate::prompt::BatchPrompt;
use crate::provider::GenerationService;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct GenerationClient<S> {
    service: S,
    request_timeout: Duration,
}

impl<S: GenerationService> GenerationClient<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(service: S, request_timeout: Duration) -> Self {
        Self {
            service,
            request_timeout,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// One free-form call. Transport errors and timeouts propagate unchanged.
    pub async fn generate_one(&self, prompt: &str) -> Result<String, ApiError> {
        let started = Instant::now();
        let text = self
            .with_deadline(self.service.generate_text(prompt))
            .await
            .inspect_err(|e| warn!(error = %e, "Single generation call failed"))?;
        debug!(
            provider = self.service.provider_name(),
            duration_ms = started.elapsed().as_millis() as u64,
            chars = text.len(),
            "Single generation call returned"
        );
        Ok(text.trim().to_string())
    }

    /// One structured call, validated against the batch shape.
    pub async fn generate_batch(&self, prompt: &BatchPrompt) -> Result<Vec<BatchEntry>, ApiError> {
        let started = Instant::now();
        let raw = self
            .with_deadline(self.service.generate_structured(&prompt.text, &prompt.schema))
            .await
            .inspect_err(|e| warn!(error = %e, "Batch generation call failed"))?;
        let entries = parse_batch_response(&raw)
            .inspect_err(|e| warn!(error = %e, "Batch response failed validation"))?;
        debug!(
            provider = self.service.provider_name(),
            duration_ms = started.elapsed().as_millis() as u64,
            entries = entries.len(),
            "Batch generation call returned"
        );
        Ok(entries
            .into_iter()
            .map(|e| BatchEntry {
                id: e.id.trim().to_string(),
                content: e.content.trim().to_string(),
            })
            .collect())
    }

    async fn with_deadline<F>(&self, call: F) -> Result<String, ApiError>
    where
        F: Future<Output = Result<String, ApiError>>,
    {
        match tokio::time::timeout(self.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::ProviderTimeout(self.request_timeout)),
        }
    }
}
