//! Batch plan and run results for whole-document generation.

use crate::outline::{OutlinePoint, PointState};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Sequence-ordered groups of point indices still needing prose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchPlan {
    pub groups: Vec<Vec<usize>>,
    pub total_points: usize,
    /// Length of the outline the plan was built against.
    pub sequence_len: usize,
}

impl BatchPlan {
    /// Select every point not yet `Done` and chunk the selection, in order.
    pub fn from_points(points: &[OutlinePoint], batch_size: usize) -> Self {
        let selected: Vec<usize> = points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.state != PointState::Done)
            .map(|(i, _)| i)
            .collect();
        let groups: Vec<Vec<usize>> = selected
            .chunks(batch_size.max(1))
            .map(<[usize]>::to_vec)
            .collect();
        Self {
            total_points: selected.len(),
            groups,
            sequence_len: points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Only the final group, and only if it ends on the final point, may conclude.
    pub fn is_last_batch(&self, group_index: usize) -> bool {
        group_index + 1 == self.groups.len()
            && self.groups[group_index].last().copied() == self.sequence_len.checked_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every point was already `Done`; no call was made.
    NothingToDo,
    Completed,
    /// Stopped between groups by the cancellation signal.
    Cancelled,
    /// A group call failed; later groups were not started.
    Halted { error: String },
    /// A new outline was submitted while the run was in flight.
    OutlineReplaced,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub batch_index: usize,
    pub generated_count: usize,
    pub failed_count: usize,
    pub total_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub batch_summaries: Vec<BatchSummary>,
    pub total_selected: usize,
    pub total_generated: usize,
    pub total_failed: usize,
}

impl RunSummary {
    pub fn new(total_selected: usize) -> Self {
        Self {
            outcome: RunOutcome::Completed,
            batch_summaries: Vec::new(),
            total_selected,
            total_generated: 0,
            total_failed: 0,
        }
    }

    pub fn batches_attempted(&self) -> usize {
        self.batch_summaries.len()
    }

    /// Selected points no group ever reached.
    pub fn untouched(&self) -> usize {
        let reached: usize = self.batch_summaries.iter().map(|b| b.total_count).sum();
        self.total_selected.saturating_sub(reached)
    }
}

/// Result of a single-point request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SingleOutcome {
    Generated,
    Failed(String),
    /// The stop signal was pending; nothing was sent.
    Cancelled,
    NotFound,
    /// The outline was replaced while the call was in flight.
    Discarded,
}
