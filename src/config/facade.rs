//! Config loading entry point: builds the layered source stack and deserializes it.

use super::merge::builder_with_defaults;
use super::sources::{environment, explicit_file, global_file};
use super::AppConfig;
use crate::error::ApiError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Loads [`AppConfig`] from defaults, the global file, an explicit file and the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    global_path: Option<PathBuf>,
    explicit_path: Option<PathBuf>,
    env: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    /// Standard stack: the user's global file, `explicit_path` if given, the process environment.
    pub fn load(explicit_path: Option<&Path>) -> Result<AppConfig, ApiError> {
        let mut loader = Self::new().with_global_file(global_file::global_config_path());
        if let Some(path) = explicit_path {
            loader = loader.with_explicit_file(path);
        }
        loader.build()
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_global_file(mut self, path: Option<PathBuf>) -> Self {
        self.global_path = path;
        self
    }

    pub fn with_explicit_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_path = Some(path.into());
        self
    }

    /// Replace the process environment with a fixed set of variables.
    pub fn with_env(mut self, vars: HashMap<String, String>) -> Self {
        self.env = Some(vars);
        self
    }

    pub fn build(self) -> Result<AppConfig, ApiError> {
        let mut builder = builder_with_defaults()?;
        builder = global_file::add_to_builder(builder, self.global_path.as_deref())?;
        if let Some(path) = self.explicit_path.as_deref() {
            debug!(config_path = %path.display(), "Loading explicit configuration");
            builder = explicit_file::add_to_builder(builder, path)?;
        }
        builder = environment::add_to_builder(builder, self.env);

        let config = builder.build()?;
        config
            .try_deserialize::<AppConfig>()
            .map_err(|e| ApiError::ConfigError(format!("Failed to deserialize config: {}", e)))
    }
}
