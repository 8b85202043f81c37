//! Outline Model
//!
//! The ordered sequence of outline points for one submitted outline. Order is
//! fixed at parse time; generation and edits mutate points in place.

pub mod parser;
pub mod point;

pub use parser::parse_outline;
pub use point::{OutlinePoint, PointId, PointState};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const SAMPLE_OUTLINE: &str = "Topic: The benefits of reading books

1. Introduction
- A general look at reading culture
- Why books still matter

2. Body
- Argument 1: Reading broadens knowledge
-- Books are the treasury of human knowledge
-- They help us understand history, culture and science
- Argument 2: Reading trains the mind
-- It improves concentration
-- It sparks a rich imagination
- Argument 3: Reading nourishes the soul
-- It relieves stress after a day of work
-- It shapes good character through moral lessons

3. Conclusion
- Reaffirm the value of reading
- Advice to keep up the reading habit";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outline {
    /// Changes every time a new outline is submitted.
    pub session: Uuid,
    pub raw_text: String,
    pub points: Vec<OutlinePoint>,
}

impl Default for Outline {
    fn default() -> Self {
        Self::parse("")
    }
}

impl Outline {
    pub fn parse(raw_text: &str) -> Self {
        Self {
            session: Uuid::new_v4(),
            raw_text: raw_text.to_string(),
            points: parse_outline(raw_text),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn index_of(&self, id: PointId) -> Option<usize> {
        self.points.iter().position(|p| p.id == id)
    }

    pub fn find(&self, id: PointId) -> Option<&OutlinePoint> {
        self.points.iter().find(|p| p.id == id)
    }

    pub fn find_mut(&mut self, id: PointId) -> Option<&mut OutlinePoint> {
        self.points.iter_mut().find(|p| p.id == id)
    }

    /// Direct user edit of a point's prose. Returns false if the id is unknown.
    pub fn set_content(&mut self, id: PointId, content: impl Into<String>) -> bool {
        match self.find_mut(id) {
            Some(point) => {
                point.content = content.into();
                true
            }
            None => false,
        }
    }

    pub fn completed_count(&self) -> usize {
        self.points
            .iter()
            .filter(|p| p.state == PointState::Done)
            .count()
    }

    pub fn count_in(&self, state: PointState) -> usize {
        self.points.iter().filter(|p| p.state == state).count()
    }

    /// Whole-number completion percentage; an empty outline reports 0.
    pub fn progress_percent(&self) -> u8 {
        if self.points.is_empty() {
            return 0;
        }
        ((self.completed_count() * 100 + self.points.len() / 2) / self.points.len()) as u8
    }

    /// The whole essay: all non-empty content joined by a blank line.
    pub fn compose_document(&self) -> String {
        self.points
            .iter()
            .filter(|p| p.has_content())
            .map(|p| p.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn point_text(&self, id: PointId) -> Option<&str> {
        self.find(id).map(|p| p.content.as_str())
    }
}
