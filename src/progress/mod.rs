//! Progress observability: an in-memory, ordered log of run events.
//!
//! Emission is best-effort and never fails the caller. Every event is also
//! mirrored to `tracing` at debug level.

pub mod event;

pub use event::{now_millis, BatchEventData, PointEventData, ProgressEvent};

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Default)]
pub struct ProgressLog {
    events: Mutex<Vec<ProgressEvent>>,
}

impl ProgressLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit_event_best_effort(&self, session: &str, event_type: &str, data: impl Serialize) {
        let data = serde_json::to_value(data).unwrap_or(Value::Null);
        debug!(session, event_type, data = %data, "progress");
        let mut events = self.events.lock();
        let seq = events.len() as u64;
        events.push(ProgressEvent {
            ts: now_millis(),
            session: session.to_string(),
            seq,
            event_type: event_type.to_string(),
            data,
        });
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().clone()
    }

    pub fn event_types(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .map(|e| e.event_type.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}
