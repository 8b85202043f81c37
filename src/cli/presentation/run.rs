//! Write command presentation: per-point status table and run headline.

use crate::orchestrator::{RunOutcome, RunSummary};
use crate::outline::{Outline, PointState};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::{Cell, Color, Table};
use owo_colors::OwoColorize;

const TEXT_PREVIEW_CHARS: usize = 48;

/// Format a section heading with bold/underline.
fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn state_cell(state: PointState) -> Cell {
    let color = match state {
        PointState::Done => Color::Green,
        PointState::Failed => Color::Red,
        PointState::Generating => Color::Yellow,
        PointState::Pending => Color::DarkGrey,
    };
    Cell::new(state.as_str()).fg(color)
}

fn preview(text: &str) -> String {
    if text.chars().count() <= TEXT_PREVIEW_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(TEXT_PREVIEW_CHARS - 3).collect();
    format!("{}...", cut)
}

fn outcome_line(summary: &RunSummary) -> String {
    match &summary.outcome {
        RunOutcome::Completed => format!("{}", "Completed".green()),
        RunOutcome::NothingToDo => format!("{}", "Nothing to do".green()),
        RunOutcome::Cancelled => format!("{}", "Stopped".yellow()),
        RunOutcome::Halted { error } => format!("{} ({})", "Halted".red(), error),
        RunOutcome::OutlineReplaced => format!("{}", "Outline replaced".yellow()),
    }
}

/// Status table for every point plus a one-line run headline.
pub fn format_run_report(outline: &Outline, summary: &RunSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Essay progress")));

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["#", "Point", "State", "Words", "Error"]);
    for (index, point) in outline.points.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(format!("{}{}", "  ".repeat(point.level), preview(&point.text))),
            state_cell(point.state),
            Cell::new(point.content.split_whitespace().count()),
            Cell::new(point.error_detail.as_deref().map(preview).unwrap_or_default()),
        ]);
    }
    out.push_str(&format!("{}\n\n", table));

    out.push_str(&format!(
        "{}: {} generated, {} failed, {} not reached, {} batch(es). {}/{} points done ({}%).",
        outcome_line(summary),
        summary.total_generated,
        summary.total_failed,
        summary.untouched(),
        summary.batches_attempted(),
        outline.completed_count(),
        outline.len(),
        outline.progress_percent()
    ));
    out
}
