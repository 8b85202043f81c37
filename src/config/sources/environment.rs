//! Environment source: `ESSAYIST__SECTION__KEY=value`, e.g. `ESSAYIST__RUN__BATCH_SIZE=3`.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;
use std::collections::HashMap;

pub const ENV_PREFIX: &str = "ESSAYIST";
pub const ENV_SEPARATOR: &str = "__";

/// Add the environment layer. `vars` replaces the process environment when given.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    vars: Option<HashMap<String, String>>,
) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
            .source(vars),
    )
}
