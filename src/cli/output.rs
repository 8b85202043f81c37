//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map domain/service errors to a string for CLI output, with a hint where one helps.
pub fn map_error(e: &ApiError) -> String {
    let hint = match e {
        ApiError::ProviderAuthFailed(_) => {
            Some("check the API key (api_key, ESSAYIST_API_KEY, GEMINI_API_KEY or OPENAI_API_KEY)")
        }
        ApiError::ProviderRateLimit(_) => Some("wait a moment, then re-run to resume"),
        ApiError::ProviderModelNotFound(_) => Some("check provider.model in the config"),
        ApiError::ProviderTimeout(_) => Some("raise run.request_timeout_secs or retry"),
        _ => None,
    };
    match hint {
        Some(hint) => format!("{}\nhint: {}", e, hint),
        None => e.to_string(),
    }
}
