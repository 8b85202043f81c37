//! Batch response validation: raw structured text to `{id, content}` entries.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub id: String,
    pub content: String,
}

/// Strip a surrounding markdown code fence, if any.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

pub fn parse_batch_response(raw: &str) -> Result<Vec<BatchEntry>, ApiError> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(ApiError::SchemaViolation("Empty response body".to_string()));
    }

    let document: Value = serde_json::from_str(body)
        .map_err(|e| ApiError::SchemaViolation(format!("Response is not valid JSON: {}", e)))?;
    let results = document
        .as_object()
        .ok_or_else(|| ApiError::SchemaViolation("Top-level value is not an object".to_string()))?
        .get("results")
        .ok_or_else(|| ApiError::SchemaViolation("Missing 'results' field".to_string()))?
        .as_array()
        .ok_or_else(|| ApiError::SchemaViolation("'results' is not an array".to_string()))?;

    results
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value::<BatchEntry>(entry.clone()).map_err(|e| {
                ApiError::SchemaViolation(format!("Entry {} is malformed: {}", index, e))
            })
        })
        .collect()
}
