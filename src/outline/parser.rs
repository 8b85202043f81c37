//! Outline text parser: raw text to an ordered list of points.
//!
//! Nesting comes from leading whitespace only, two columns per level. A tab
//! counts as two columns. Bullets and numbering stay in the point text and do
//! not affect the level, so `-- sub` at column zero is still level 0.

use crate::outline::point::OutlinePoint;

const COLUMNS_PER_LEVEL: usize = 2;

pub fn parse_outline(raw: &str) -> Vec<OutlinePoint> {
    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| OutlinePoint::new(line.trim(), indentation_level(line)))
        .collect()
}

fn indentation_level(line: &str) -> usize {
    let columns: usize = line
        .chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { COLUMNS_PER_LEVEL } else { 1 })
        .sum();
    columns / COLUMNS_PER_LEVEL
}
