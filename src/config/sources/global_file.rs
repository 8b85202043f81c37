//! Global config file source: $XDG_CONFIG_HOME/essayist/config.toml or ~/.config/essayist/config.toml

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::{File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path to global config file.
pub fn global_config_path() -> Option<PathBuf> {
    let config_home = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|dir| !dir.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|home| PathBuf::from(home).join(".config"))
        })?;
    Some(config_home.join("essayist").join("config.toml"))
}

/// Add the global config file to the builder if it exists. A missing file is not an error.
pub fn add_to_builder(
    mut builder: ConfigBuilder<DefaultState>,
    path: Option<&Path>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let Some(path) = path else {
        return Ok(builder);
    };
    if path.exists() {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        debug!(config_path = %canonical.display(), "Loading global configuration");
        builder = builder.add_source(
            File::from(canonical.as_path())
                .format(FileFormat::Toml)
                .required(false),
        );
    } else {
        debug!(
            config_path = %path.display(),
            "No global configuration file; using defaults"
        );
    }
    Ok(builder)
}
