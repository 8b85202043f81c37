//! Outline command presentation: parsed points as text or json.

use crate::outline::Outline;
use serde_json::json;

pub fn format_outline_text(outline: &Outline) -> String {
    if outline.is_empty() {
        return "Outline is empty.".to_string();
    }
    let mut output = String::new();
    for (index, point) in outline.points.iter().enumerate() {
        output.push_str(&format!(
            "{:>3}  {}{}\n",
            index + 1,
            "  ".repeat(point.level),
            point.text
        ));
    }
    output.push_str(&format!("\nTotal: {} point(s)", outline.len()));
    output
}

pub fn format_outline_json(outline: &Outline) -> String {
    let points: Vec<_> = outline
        .points
        .iter()
        .enumerate()
        .map(|(index, point)| {
            json!({
                "number": index + 1,
                "id": point.id,
                "text": point.text,
                "level": point.level,
            })
        })
        .collect();
    let out = json!({ "points": points, "total": outline.len() });
    serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
}
