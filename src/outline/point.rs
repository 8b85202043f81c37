//! Outline point: one line of the outline plus its generation lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque point identifier, assigned at parse time and stable for the point's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(Uuid);

impl PointId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse the textual form used in batch requests and responses.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s.trim()).ok().map(Self)
    }
}

impl Default for PointId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointState {
    Pending,
    Generating,
    Done,
    Failed,
}

impl PointState {
    pub fn as_str(self) -> &'static str {
        match self {
            PointState::Pending => "pending",
            PointState::Generating => "generating",
            PointState::Done => "done",
            PointState::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlinePoint {
    pub id: PointId,
    pub text: String,
    pub level: usize,
    pub content: String,
    pub state: PointState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl OutlinePoint {
    pub fn new(text: impl Into<String>, level: usize) -> Self {
        Self {
            id: PointId::new(),
            text: text.into(),
            level,
            content: String::new(),
            state: PointState::Pending,
            error_detail: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.level == 0
    }

    pub fn has_content(&self) -> bool {
        !self.content.trim().is_empty()
    }

    /// Enter `Generating`. Valid from any state; `Failed -> Generating` is a retry.
    pub fn begin(&mut self) {
        self.state = PointState::Generating;
    }

    /// Commit generated prose. Overwrites any manual edit made while in flight.
    pub fn complete(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.state = PointState::Done;
        self.error_detail = None;
    }

    /// Record a failure; existing content is kept.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.state = PointState::Failed;
        self.error_detail = Some(message.into());
    }
}
