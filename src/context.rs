//! Context Assembler
//!
//! Pure functions that compute the grounding context for a position in the
//! outline: the prose already written before it and the points coming after it.

use crate::outline::{OutlinePoint, PointId};

pub const DEFAULT_LOOK_AHEAD: usize = 3;

/// Blank-line join of every non-empty `content` strictly before `id`, in
/// sequence order and regardless of level. Empty when `id` is first or unknown.
pub fn accumulated_text(id: PointId, sequence: &[OutlinePoint]) -> String {
    let Some(index) = sequence.iter().position(|p| p.id == id) else {
        return String::new();
    };
    accumulated_before(index, sequence)
}

pub(crate) fn accumulated_before(index: usize, sequence: &[OutlinePoint]) -> String {
    sequence[..index.min(sequence.len())]
        .iter()
        .filter(|p| p.has_content())
        .map(|p| p.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Text of up to `count` points strictly after `id`.
pub fn look_ahead_points(id: PointId, sequence: &[OutlinePoint], count: usize) -> Vec<String> {
    match sequence.iter().position(|p| p.id == id) {
        Some(index) => look_ahead_after(index, sequence, count),
        None => Vec::new(),
    }
}

pub(crate) fn look_ahead_after(index: usize, sequence: &[OutlinePoint], count: usize) -> Vec<String> {
    sequence
        .iter()
        .skip(index + 1)
        .take(count)
        .map(|p| p.text.clone())
        .collect()
}

/// The last `max_chars` characters of `text`, cut on a character boundary.
pub fn trailing_slice(text: &str, max_chars: usize) -> &str {
    let total = text.chars().count();
    if total <= max_chars {
        return text;
    }
    let skip = total - max_chars;
    match text.char_indices().nth(skip) {
        Some((byte_index, _)) => &text[byte_index..],
        None => "",
    }
}
