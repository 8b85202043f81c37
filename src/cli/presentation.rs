//! CLI presentation: text and json formatters per command family.

mod outline;
mod run;

pub use outline::{format_outline_json, format_outline_text};
pub use run::format_run_report;
