//! Merge rules: defaults, override order, conflict handling.
//!
//! Later sources override earlier ones key by key; tables merge, arrays replace.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("provider.provider_type", "gemini")?
        .set_default("provider.model", "gemini-2.5-flash")?
        .set_default("run.batch_size", 5_i64)?
        .set_default("run.batch_delay_ms", 200_i64)?
        .set_default("run.look_ahead", 3_i64)?
        .set_default("run.context_tail_chars", 2000_i64)?
        .set_default("run.request_timeout_secs", 120_i64)
}
