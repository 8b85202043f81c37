//! CLI parse: clap types for Essayist. No behavior; definitions only.

use crate::settings::DetailLevel;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Essayist CLI - turn an outline into a finished essay
#[derive(Parser)]
#[command(name = "essayist")]
#[command(about = "Write an essay from an outline, section by section, with an LLM")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config file)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (when output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

/// Tone, language and detail overrides applied on top of the configured defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct StyleArgs {
    /// Tone descriptor to use (repeatable); replaces the default selection
    #[arg(long = "tone")]
    pub tones: Vec<String>,

    /// Register and select a custom tone (repeatable)
    #[arg(long = "custom-tone")]
    pub custom_tones: Vec<String>,

    /// Output language
    #[arg(long)]
    pub language: Option<String>,

    /// Detail level (brief, standard, detailed)
    #[arg(long)]
    pub detail: Option<DetailLevel>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate prose for every point and print the composed essay
    Write {
        /// Outline file, or "-" for stdin
        input: PathBuf,

        #[command(flatten)]
        style: StyleArgs,

        /// Points per generation request (overrides config)
        #[arg(long)]
        batch_size: Option<usize>,

        /// Write the essay to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Re-run to retry failed points up to N more times
        #[arg(long, default_value = "0")]
        resume_failed_retries: u32,

        /// Append progress events as JSON lines to this file
        #[arg(long)]
        events: Option<PathBuf>,
    },
    /// Generate prose for a single point and print it
    Point {
        /// Outline file, or "-" for stdin
        input: PathBuf,

        /// 1-based point number, as listed by `essayist outline`
        #[arg(long)]
        point: usize,

        #[command(flatten)]
        style: StyleArgs,
    },
    /// Parse an outline and list its points
    Outline {
        /// Outline file, or "-" for stdin
        input: PathBuf,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the prompt that would be sent for a point, without calling a provider
    Prompt {
        /// Outline file, or "-" for stdin
        input: PathBuf,

        /// 1-based point number
        #[arg(long)]
        point: usize,

        /// Render the batch prompt for the group containing the point
        #[arg(long)]
        batch: bool,

        #[command(flatten)]
        style: StyleArgs,
    },
    /// Print the bundled sample outline
    Sample,
    /// Print the effective configuration as TOML (API key redacted)
    Config,
}
