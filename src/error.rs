//! Error types for the essay generation pipeline.

use crate::outline::PointId;
use std::time::Duration;
use thiserror::Error;

/// Coarse classification of failures, used by callers that only care whether a
/// unit of work failed in transit, came back malformed, or was a rejected edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network or service failure, including timeouts.
    Transport,
    /// A response arrived but did not match the requested structure.
    Schema,
    /// A configuration edit that would break an invariant.
    UserConfig,
    Other,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Provider request failed: {0}")]
    ProviderRequestFailed(String),

    #[error("Provider authentication failed: {0}")]
    ProviderAuthFailed(String),

    #[error("Provider rate limit exceeded: {0}")]
    ProviderRateLimit(String),

    #[error("Provider model not found: {0}")]
    ProviderModelNotFound(String),

    #[error("Provider did not respond within {0:?}")]
    ProviderTimeout(Duration),

    #[error("Malformed structured response: {0}")]
    SchemaViolation(String),

    #[error("Rejected configuration change: {0}")]
    UserConfigViolation(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Outline point not found: {0}")]
    PointNotFound(PointId),

    #[error("A generation run is already in progress")]
    GenerationInProgress,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::ProviderError(_)
            | ApiError::ProviderRequestFailed(_)
            | ApiError::ProviderAuthFailed(_)
            | ApiError::ProviderRateLimit(_)
            | ApiError::ProviderModelNotFound(_)
            | ApiError::ProviderTimeout(_) => ErrorKind::Transport,
            ApiError::SchemaViolation(_) => ErrorKind::Schema,
            ApiError::UserConfigViolation(_) => ErrorKind::UserConfig,
            ApiError::ConfigError(_)
            | ApiError::GenerationFailed(_)
            | ApiError::PointNotFound(_)
            | ApiError::GenerationInProgress
            | ApiError::Io(_) => ErrorKind::Other,
        }
    }

    /// True for failures that mean "this unit of work did not complete".
    pub fn is_generation_failure(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transport | ErrorKind::Schema)
    }
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
