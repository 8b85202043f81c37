//! Configuration System
//!
//! Layered application configuration: built-in defaults, the user's global
//! config file, an explicit `--config` file, then `ESSAYIST__*` environment
//! variables. Validation collects every problem instead of stopping at the first.

use crate::error::ApiError;
use crate::generation::DEFAULT_REQUEST_TIMEOUT;
use crate::logging::LoggingConfig;
use crate::orchestrator::{RunPolicy, DEFAULT_BATCH_DELAY, DEFAULT_BATCH_SIZE};
use crate::prompt::DEFAULT_CONTEXT_TAIL_CHARS;
use crate::settings::{DetailLevel, GenerationConfig, TONE_PRESETS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use crate::provider::{ProviderConfig, ProviderType};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generation service used by `write`
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Run sequencing and request limits
    #[serde(default)]
    pub run: RunConfig,

    /// Seeds the process-start generation settings
    #[serde(default)]
    pub defaults: StyleDefaults,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between successful groups, in milliseconds
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,

    #[serde(default = "default_look_ahead")]
    pub look_ahead: usize,

    /// Characters of prior prose carried into each prompt
    #[serde(default = "default_context_tail_chars")]
    pub context_tail_chars: usize,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_batch_delay_ms() -> u64 {
    DEFAULT_BATCH_DELAY.as_millis() as u64
}

fn default_look_ahead() -> usize {
    crate::context::DEFAULT_LOOK_AHEAD
}

fn default_context_tail_chars() -> usize {
    DEFAULT_CONTEXT_TAIL_CHARS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_secs()
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            look_ahead: default_look_ahead(),
            context_tail_chars: default_context_tail_chars(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl RunConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("batch_size must be at least 1".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be at least 1".to_string());
        }
        if self.context_tail_chars == 0 {
            return Err("context_tail_chars must be at least 1".to_string());
        }
        Ok(())
    }
}

impl From<&RunConfig> for RunPolicy {
    fn from(run: &RunConfig) -> Self {
        RunPolicy {
            batch_size: run.batch_size,
            batch_delay: Duration::from_millis(run.batch_delay_ms),
            look_ahead: run.look_ahead,
            context_tail_chars: run.context_tail_chars,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleDefaults {
    #[serde(default = "default_tones")]
    pub tones: Vec<String>,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub detail_level: DetailLevel,
}

fn default_tones() -> Vec<String> {
    vec![TONE_PRESETS[0].1.to_string()]
}

fn default_language() -> String {
    "English".to_string()
}

impl Default for StyleDefaults {
    fn default() -> Self {
        Self {
            tones: default_tones(),
            language: default_language(),
            detail_level: DetailLevel::default(),
        }
    }
}

impl StyleDefaults {
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig::new(self.tones.clone(), self.language.clone(), self.detail_level)
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Provider(String),
    Run(String),
    Defaults(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Provider(msg) => write!(f, "Provider: {}", msg),
            ValidationError::Run(msg) => write!(f, "Run: {}", msg),
            ValidationError::Defaults(msg) => write!(f, "Defaults: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl AppConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.provider.validate() {
            errors.push(ValidationError::Provider(e));
        }
        if let Err(e) = self.run.validate() {
            errors.push(ValidationError::Run(e));
        }
        if self.defaults.tones.iter().all(|t| t.trim().is_empty()) {
            errors.push(ValidationError::Defaults(
                "At least one default tone is required".to_string(),
            ));
        }
        if self.defaults.language.trim().is_empty() {
            errors.push(ValidationError::Defaults(
                "Default language cannot be empty".to_string(),
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// `validate` folded into a single `ConfigError`.
    pub fn ensure_valid(&self) -> Result<(), ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }

    pub fn run_policy(&self) -> RunPolicy {
        RunPolicy::from(&self.run)
    }
}
