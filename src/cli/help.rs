//! CLI command-name contract for logging and routing.

use crate::cli::parse::Commands;

/// Command name string for log fields (e.g. "write", "outline").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Write { .. } => "write",
        Commands::Point { .. } => "point",
        Commands::Outline { .. } => "outline",
        Commands::Prompt { .. } => "prompt",
        Commands::Sample => "sample",
        Commands::Config => "config",
    }
}
