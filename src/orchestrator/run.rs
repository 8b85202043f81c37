//! Whole-document generation: executes a batch plan group by group.

use super::plan::{BatchPlan, BatchSummary, RunOutcome, RunSummary};
use super::{GeneratingGuard, Orchestrator};
use crate::context::{accumulated_before, look_ahead_after};
use crate::error::ApiError;
use crate::generation::BatchEntry;
use crate::outline::{OutlinePoint, PointId};
use crate::progress::{BatchEventData, PointEventData};
use crate::prompt::{build_batch_prompt, PromptContext};
use crate::provider::GenerationService;
use serde_json::json;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};

pub(super) const MISSING_RESULT_MESSAGE: &str = "No result returned for this point";

/// Group entries by point id. Unknown or unparseable ids are dropped; the first entry per id wins.
fn index_entries(entries: Vec<BatchEntry>, group: &[PointId]) -> HashMap<PointId, String> {
    let mut by_id = HashMap::with_capacity(entries.len());
    for entry in entries {
        match PointId::parse(&entry.id).filter(|id| group.contains(id)) {
            Some(id) => {
                if by_id.contains_key(&id) {
                    warn!(point_id = %id, "Duplicate id in batch response; keeping the first entry");
                } else {
                    by_id.insert(id, entry.content);
                }
            }
            None => warn!(id = %entry.id, "Batch response id is not in the group; ignored"),
        }
    }
    by_id
}

impl<S: GenerationService> Orchestrator<S> {
    /// Fill every point that is not yet `Done`, in groups, until the plan is
    /// exhausted, a group call fails, or a stop is requested.
    pub async fn generate_all(&self) -> Result<RunSummary, ApiError> {
        let _guard = GeneratingGuard::acquire(&self.generating)?;
        self.cancel.clear();
        let summary = self.execute_plan().await;
        self.cancel.clear();
        Ok(summary)
    }

    async fn execute_plan(&self) -> RunSummary {
        let (session_id, raw_text, mut working) = {
            let outline = self.outline.read();
            (outline.session, outline.raw_text.clone(), outline.points.clone())
        };
        let session = session_id.to_string();
        let plan = BatchPlan::from_points(&working, self.policy.batch_size);
        let mut summary = RunSummary::new(plan.total_points);

        if plan.is_empty() {
            info!("Nothing to generate; every point is done");
            summary.outcome = RunOutcome::NothingToDo;
            return summary;
        }

        info!(
            groups = plan.groups.len(),
            points = plan.total_points,
            "Whole-document generation started"
        );
        self.emit_event(
            &session,
            "run_started",
            json!({
                "total_groups": plan.groups.len(),
                "total_points": plan.total_points,
                "batch_size": self.policy.batch_size,
            }),
        );

        for (batch_index, group) in plan.groups.iter().enumerate() {
            if self.cancel.is_stopped() {
                info!(batch_index, "Run cancelled before group");
                self.emit_event(&session, "run_cancelled", json!({ "next_batch_index": batch_index }));
                summary.outcome = RunOutcome::Cancelled;
                break;
            }

            let (Some(&first), Some(&last)) = (group.first(), group.last()) else {
                continue;
            };
            let ids: Vec<PointId> = group.iter().map(|&i| working[i].id).collect();
            {
                let mut outline = self.outline.write();
                if outline.session != session_id {
                    summary.outcome = RunOutcome::OutlineReplaced;
                    break;
                }
                for &id in &ids {
                    if let Some(point) = outline.find_mut(id) {
                        point.begin();
                    }
                }
            }
            for &i in group {
                working[i].begin();
            }

            let accumulated = accumulated_before(first, &working);
            let look_ahead = look_ahead_after(last, &working, self.policy.look_ahead);
            let is_last_batch = plan.is_last_batch(batch_index);
            let points: Vec<OutlinePoint> = group.iter().map(|&i| working[i].clone()).collect();
            let settings = self.settings();
            let ctx = PromptContext::new(&raw_text, &accumulated, &look_ahead, &settings)
                .with_tail_chars(self.policy.context_tail_chars);
            let prompt = build_batch_prompt(&points, &ctx, is_last_batch);

            let id_strings: Vec<String> = ids.iter().map(ToString::to_string).collect();
            self.emit_event(
                &session,
                "batch_started",
                BatchEventData {
                    batch_index,
                    point_ids: id_strings.clone(),
                    duration_ms: None,
                    error: None,
                },
            );
            debug!(batch_index, points = group.len(), is_last_batch, "Dispatching group");

            let started = Instant::now();
            let result = self.client.generate_batch(&prompt).await;
            let duration_ms = Some(started.elapsed().as_millis());

            match result {
                Ok(entries) => {
                    let mut results = index_entries(entries, &ids);
                    let mut batch = BatchSummary {
                        batch_index,
                        generated_count: 0,
                        failed_count: 0,
                        total_count: group.len(),
                    };
                    let mut missing = Vec::new();
                    {
                        let mut outline = self.outline.write();
                        if outline.session != session_id {
                            warn!(batch_index, "Outline replaced during run; group results discarded");
                            summary.outcome = RunOutcome::OutlineReplaced;
                            break;
                        }
                        for (&i, &id) in group.iter().zip(&ids) {
                            match results.remove(&id) {
                                Some(content) => {
                                    working[i].complete(content.clone());
                                    if let Some(point) = outline.find_mut(id) {
                                        point.complete(content);
                                    }
                                    batch.generated_count += 1;
                                }
                                None => {
                                    working[i].fail(MISSING_RESULT_MESSAGE);
                                    if let Some(point) = outline.find_mut(id) {
                                        point.fail(MISSING_RESULT_MESSAGE);
                                    }
                                    batch.failed_count += 1;
                                    missing.push(id);
                                }
                            }
                        }
                    }

                    for id in missing {
                        warn!(point_id = %id, batch_index, "Point missing from batch response");
                        self.emit_event(
                            &session,
                            "point_missing",
                            PointEventData {
                                point_id: id.to_string(),
                                duration_ms: None,
                                error: Some(MISSING_RESULT_MESSAGE.to_string()),
                            },
                        );
                    }
                    self.emit_event(
                        &session,
                        "batch_completed",
                        json!({
                            "batch_index": batch_index,
                            "point_ids": id_strings,
                            "duration_ms": duration_ms,
                            "generated_count": batch.generated_count,
                            "failed_count": batch.failed_count,
                        }),
                    );
                    summary.total_generated += batch.generated_count;
                    summary.total_failed += batch.failed_count;
                    summary.batch_summaries.push(batch);

                    let more_groups = batch_index + 1 < plan.groups.len();
                    if more_groups && !self.policy.batch_delay.is_zero() {
                        tokio::time::sleep(self.policy.batch_delay).await;
                    }
                }
                Err(err) => {
                    let message = err.to_string();
                    {
                        let mut outline = self.outline.write();
                        if outline.session != session_id {
                            warn!(batch_index, error = %message, "Outline replaced during run; group failure discarded");
                            summary.outcome = RunOutcome::OutlineReplaced;
                            break;
                        }
                        for (&i, &id) in group.iter().zip(&ids) {
                            working[i].fail(message.clone());
                            if let Some(point) = outline.find_mut(id) {
                                point.fail(message.clone());
                            }
                        }
                    }
                    warn!(batch_index, error = %message, "Group failed; halting run");
                    self.emit_event(
                        &session,
                        "batch_failed",
                        BatchEventData {
                            batch_index,
                            point_ids: id_strings,
                            duration_ms,
                            error: Some(message.clone()),
                        },
                    );
                    summary.total_failed += group.len();
                    summary.batch_summaries.push(BatchSummary {
                        batch_index,
                        generated_count: 0,
                        failed_count: group.len(),
                        total_count: group.len(),
                    });
                    summary.outcome = RunOutcome::Halted { error: message };
                    break;
                }
            }
        }

        info!(
            generated = summary.total_generated,
            failed = summary.total_failed,
            untouched = summary.untouched(),
            outcome = ?summary.outcome,
            "Whole-document generation finished"
        );
        self.emit_event(
            &session,
            "run_completed",
            json!({
                "outcome": summary.outcome,
                "total_generated": summary.total_generated,
                "total_failed": summary.total_failed,
                "batches_attempted": summary.batches_attempted(),
            }),
        );
        summary
    }
}
