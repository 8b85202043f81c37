//! Orchestrator
//!
//! Owns the outline model, the generation settings and the stop signal, and
//! drives single-point and whole-document generation against a
//! [`GenerationClient`]. State is held behind shared handles so a concurrent
//! caller (a signal handler, an editor) can stop a run or edit content while
//! a call is in flight. Locks are only taken for synchronous sections and are
//! never held across the service call.

pub mod plan;
mod run;

pub use plan::{BatchPlan, BatchSummary, RunOutcome, RunSummary, SingleOutcome, DEFAULT_BATCH_SIZE};

use crate::context::{accumulated_before, look_ahead_after, DEFAULT_LOOK_AHEAD};
use crate::error::ApiError;
use crate::generation::GenerationClient;
use crate::outline::{Outline, PointId};
use crate::progress::{PointEventData, ProgressLog};
use crate::prompt::{build_single_prompt, PromptContext, DEFAULT_CONTEXT_TAIL_CHARS};
use crate::provider::GenerationService;
use crate::settings::{ConfigUpdate, GenerationConfig};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(200);

/// Sequencing knobs for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPolicy {
    pub batch_size: usize,
    /// Pause after each successful group except the last.
    pub batch_delay: Duration,
    pub look_ahead: usize,
    pub context_tail_chars: usize,
}

impl Default for RunPolicy {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: DEFAULT_BATCH_DELAY,
            look_ahead: DEFAULT_LOOK_AHEAD,
            context_tail_chars: DEFAULT_CONTEXT_TAIL_CHARS,
        }
    }
}

/// Clonable stop signal. Checked between units of work, never mid-call.
#[derive(Debug, Clone, Default)]
pub struct CancellationHandle {
    flag: Arc<AtomicBool>,
}

impl CancellationHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    /// Clear the flag, returning whether it was set.
    pub fn take(&self) -> bool {
        self.flag.swap(false, Ordering::SeqCst)
    }
}

/// Holds the generating flag for the lifetime of one operation.
struct GeneratingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> GeneratingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, ApiError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ApiError::GenerationInProgress)?;
        Ok(Self { flag })
    }
}

impl Drop for GeneratingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct Orchestrator<S> {
    client: GenerationClient<S>,
    outline: Arc<RwLock<Outline>>,
    settings: Arc<RwLock<GenerationConfig>>,
    cancel: CancellationHandle,
    generating: AtomicBool,
    policy: RunPolicy,
    progress: Option<Arc<ProgressLog>>,
}

impl<S: GenerationService> Orchestrator<S> {
    pub fn new(client: GenerationClient<S>, settings: GenerationConfig) -> Self {
        Self {
            client,
            outline: Arc::new(RwLock::new(Outline::default())),
            settings: Arc::new(RwLock::new(settings)),
            cancel: CancellationHandle::new(),
            generating: AtomicBool::new(false),
            policy: RunPolicy::default(),
            progress: None,
        }
    }

    pub fn with_policy(mut self, policy: RunPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_progress(mut self, progress: Arc<ProgressLog>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn cancellation_handle(&self) -> CancellationHandle {
        self.cancel.clone()
    }

    /// Shared handle to the live model, for observers and editors.
    pub fn outline_handle(&self) -> Arc<RwLock<Outline>> {
        Arc::clone(&self.outline)
    }

    pub fn outline(&self) -> Outline {
        self.outline.read().clone()
    }

    pub fn settings(&self) -> GenerationConfig {
        self.settings.read().clone()
    }

    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::Acquire)
    }

    /// Replace the model with a freshly parsed outline. Returns the point count.
    pub fn process_outline(&self, raw_text: &str) -> usize {
        let outline = Outline::parse(raw_text);
        let count = outline.len();
        *self.outline.write() = outline;
        info!(points = count, "Outline processed");
        count
    }

    pub fn update_config(&self, update: ConfigUpdate) -> Result<(), ApiError> {
        self.settings.write().apply(update)
    }

    /// Direct user edit. Status is left as is; an in-flight result still overwrites it.
    pub fn update_point_content(&self, id: PointId, text: &str) -> Result<(), ApiError> {
        if self.outline.write().set_content(id, text) {
            Ok(())
        } else {
            Err(ApiError::PointNotFound(id))
        }
    }

    pub fn stop(&self) {
        info!("Stop requested");
        self.cancel.stop();
    }

    /// Generate prose for one point against the current sequence.
    pub async fn generate_single(&self, id: PointId) -> Result<SingleOutcome, ApiError> {
        let _guard = GeneratingGuard::acquire(&self.generating)?;
        if self.cancel.take() {
            info!(point_id = %id, "Single generation skipped: stop was pending");
            return Ok(SingleOutcome::Cancelled);
        }

        let (session, raw_text, point, accumulated, look_ahead, is_last) = {
            let mut outline = self.outline.write();
            let Some(index) = outline.index_of(id) else {
                return Ok(SingleOutcome::NotFound);
            };
            outline.points[index].begin();
            let point = outline.points[index].clone();
            (
                outline.session,
                outline.raw_text.clone(),
                point,
                accumulated_before(index, &outline.points),
                look_ahead_after(index, &outline.points, self.policy.look_ahead),
                index + 1 == outline.len(),
            )
        };
        let settings = self.settings();
        let ctx = PromptContext::new(&raw_text, &accumulated, &look_ahead, &settings)
            .with_tail_chars(self.policy.context_tail_chars);
        let prompt = build_single_prompt(&point, &ctx, is_last);

        let started = Instant::now();
        let result = self.client.generate_one(&prompt).await;
        let duration_ms = Some(started.elapsed().as_millis());
        self.cancel.clear();

        let mut outline = self.outline.write();
        if outline.session != session {
            warn!(point_id = %id, "Outline replaced during generation; result discarded");
            return Ok(SingleOutcome::Discarded);
        }
        let Some(target) = outline.find_mut(id) else {
            return Ok(SingleOutcome::Discarded);
        };
        let session = session.to_string();
        match result {
            Ok(text) => {
                target.complete(text);
                drop(outline);
                self.emit_event(
                    &session,
                    "point_generated",
                    PointEventData {
                        point_id: id.to_string(),
                        duration_ms,
                        error: None,
                    },
                );
                Ok(SingleOutcome::Generated)
            }
            Err(err) => {
                let message = err.to_string();
                target.fail(message.clone());
                drop(outline);
                warn!(point_id = %id, error = %message, "Point generation failed");
                self.emit_event(
                    &session,
                    "point_failed",
                    PointEventData {
                        point_id: id.to_string(),
                        duration_ms,
                        error: Some(message.clone()),
                    },
                );
                Ok(SingleOutcome::Failed(message))
            }
        }
    }

    /// Best-effort progress emission; no-op without a log.
    fn emit_event(&self, session: &str, event_type: &str, data: impl Serialize) {
        if let Some(progress) = self.progress.as_ref() {
            progress.emit_event_best_effort(session, event_type, data);
        }
    }
}
