//! Whole-document and single-point generation against a scripted service.

use crate::integration::test_utils::{flat_outline, ids_in, orchestrator_for, prose_for, Reply, ScriptedService};
use essayist::error::ApiError;
use essayist::orchestrator::{RunOutcome, SingleOutcome};
use essayist::outline::{Outline, PointState};
use essayist::progress::ProgressLog;
use std::sync::Arc;
use std::time::Duration;

fn states(outline: &Outline) -> Vec<PointState> {
    outline.points.iter().map(|p| p.state).collect()
}

#[tokio::test]
async fn second_run_over_finished_outline_makes_no_calls() {
    let service = ScriptedService::new();
    let orch = orchestrator_for(&service, &flat_outline(7));
    let first = orch.generate_all().await.unwrap();
    assert_eq!(first.outcome, RunOutcome::Completed);
    assert_eq!(service.call_count(), 2);
    let before = orch.outline();

    let second = orch.generate_all().await.unwrap();
    assert_eq!(second.outcome, RunOutcome::NothingToDo);
    assert_eq!(second.batches_attempted(), 0);
    assert_eq!(service.call_count(), 2);
    assert_eq!(orch.outline().points, before.points);
}

#[tokio::test]
async fn resumed_run_targets_only_unfinished_points_as_one_group() {
    let service = ScriptedService::new();
    let orch = orchestrator_for(&service, &flat_outline(5));
    let ids: Vec<String> = {
        let handle = orch.outline_handle();
        let mut outline = handle.write();
        outline.points[0].complete("Already written.");
        outline.points[1].fail("earlier quota error");
        outline.points.iter().map(|p| p.id.to_string()).collect()
    };

    let summary = orch.generate_all().await.unwrap();
    assert_eq!(summary.batches_attempted(), 1);
    assert_eq!(summary.total_selected, 4);
    let prompts = service.prompts();
    assert_eq!(prompts.len(), 1);
    assert_eq!(ids_in(&prompts[0]), ids[1..].to_vec());

    let outline = orch.outline();
    assert_eq!(outline.points[0].content, "Already written.");
    assert!(states(&outline).iter().all(|s| *s == PointState::Done));
    assert_eq!(outline.points[1].error_detail, None);
}

#[tokio::test]
async fn failed_batch_marks_its_group_and_spares_later_groups() {
    let service = ScriptedService::new();
    service.push_reply(Reply::Echo);
    service.push_reply(Reply::Fail("upstream 503".to_string()));
    let orch = orchestrator_for(&service, &flat_outline(12));

    let summary = orch.generate_all().await.unwrap();
    assert!(matches!(summary.outcome, RunOutcome::Halted { ref error } if error.contains("upstream 503")));
    assert_eq!(service.call_count(), 2);

    let outline = orch.outline();
    let messages: Vec<_> = outline.points[5..10]
        .iter()
        .map(|p| p.error_detail.clone().unwrap())
        .collect();
    assert!(messages.iter().all(|m| m == &messages[0]));
    assert!(outline.points[5..10].iter().all(|p| p.state == PointState::Failed));
    assert!(outline.points[10..].iter().all(|p| p.state == PointState::Pending));
    assert!(outline.points[..5].iter().all(|p| p.state == PointState::Done));
}

#[tokio::test]
async fn stop_during_a_group_lets_it_commit_and_blocks_the_next() {
    let service = ScriptedService::new();
    let orch = orchestrator_for(&service, &flat_outline(12));
    let handle = orch.cancellation_handle();
    service.on_call(1, move || handle.stop());
    let progress = Arc::new(ProgressLog::new());
    let orch = orch.with_progress(Arc::clone(&progress));

    let summary = orch.generate_all().await.unwrap();
    assert_eq!(summary.outcome, RunOutcome::Cancelled);
    assert_eq!(service.call_count(), 1);
    assert_eq!(summary.untouched(), 7);

    let outline = orch.outline();
    assert!(outline.points[..5].iter().all(|p| p.state == PointState::Done));
    assert!(outline.points[5..].iter().all(|p| p.state == PointState::Pending));
    assert_eq!(outline.count_in(PointState::Generating), 0);
    assert!(!orch.cancellation_handle().is_stopped());
    assert!(progress.event_types().contains(&"run_cancelled".to_string()));

    let resumed = orch.generate_all().await.unwrap();
    assert_eq!(resumed.outcome, RunOutcome::Completed);
    assert_eq!(resumed.total_generated, 7);
}

#[tokio::test]
async fn in_flight_result_overwrites_a_concurrent_manual_edit() {
    let service = ScriptedService::new();
    let orch = orchestrator_for(&service, &flat_outline(3));
    let target = orch.outline().points[1].id;
    let handle = orch.outline_handle();
    service.on_call(1, move || {
        handle.write().set_content(target, "My hand-written paragraph.");
    });

    orch.generate_all().await.unwrap();
    let point = orch.outline().find(target).cloned().unwrap();
    assert_eq!(point.state, PointState::Done);
    assert_eq!(point.content, prose_for(&target.to_string()));
}

#[tokio::test]
async fn later_groups_see_earlier_groups_prose() {
    let service = ScriptedService::new();
    let orch = orchestrator_for(&service, &flat_outline(7));
    orch.generate_all().await.unwrap();

    let outline = orch.outline();
    let prompts = service.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains("[Introduction]"));
    assert!(prompts[1].contains(&prose_for(&outline.points[4].id.to_string())));
    assert!(prompts[0].contains("- Point 6; - Point 7"));
}

#[tokio::test]
async fn only_the_final_group_is_asked_to_conclude() {
    let service = ScriptedService::new();
    let orch = orchestrator_for(&service, &flat_outline(11));
    orch.generate_all().await.unwrap();

    let prompts = service.prompts();
    assert_eq!(prompts.len(), 3);
    for prompt in &prompts[..2] {
        assert!(prompt.contains("DO NOT write a concluding sentence"));
    }
    assert!(prompts[2].contains("meaningful conclusion"));
    assert!(!prompts[2].contains("DO NOT write a concluding sentence"));
}

#[tokio::test]
async fn missing_ids_end_failed_never_stuck_generating() {
    let service = ScriptedService::new();
    service.push_reply(Reply::EchoDropping(2));
    let orch = orchestrator_for(&service, &flat_outline(5));

    let summary = orch.generate_all().await.unwrap();
    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.total_generated, 3);
    assert_eq!(summary.total_failed, 2);
    let outline = orch.outline();
    assert_eq!(outline.count_in(PointState::Generating), 0);
    assert_eq!(
        states(&outline),
        vec![
            PointState::Done,
            PointState::Done,
            PointState::Done,
            PointState::Failed,
            PointState::Failed
        ]
    );
}

#[tokio::test]
async fn malformed_batch_response_halts_like_a_transport_failure() {
    let service = ScriptedService::new();
    service.push_reply(Reply::Raw("{\"items\": []}".to_string()));
    let orch = orchestrator_for(&service, &flat_outline(7));

    let summary = orch.generate_all().await.unwrap();
    assert!(matches!(summary.outcome, RunOutcome::Halted { ref error } if error.contains("results")));
    let outline = orch.outline();
    assert!(outline.points[..5].iter().all(|p| p.state == PointState::Failed));
    assert!(outline.points[5..].iter().all(|p| p.state == PointState::Pending));
}

#[tokio::test]
async fn replacing_the_outline_mid_run_discards_results() {
    let service = ScriptedService::new();
    let orch = orchestrator_for(&service, &flat_outline(7));
    let handle = orch.outline_handle();
    service.on_call(1, move || {
        *handle.write() = Outline::parse("Fresh title\n- Fresh point");
    });

    let summary = orch.generate_all().await.unwrap();
    assert_eq!(summary.outcome, RunOutcome::OutlineReplaced);
    assert_eq!(service.call_count(), 1);
    let outline = orch.outline();
    assert_eq!(outline.len(), 2);
    assert!(states(&outline).iter().all(|s| *s == PointState::Pending));
}

#[tokio::test]
async fn replaced_outline_wins_over_a_failed_group() {
    let service = ScriptedService::new();
    service.push_reply(Reply::Fail("upstream 503".to_string()));
    let orch = orchestrator_for(&service, &flat_outline(7));
    let handle = orch.outline_handle();
    service.on_call(1, move || {
        *handle.write() = Outline::parse("Fresh title\n- Fresh point");
    });

    let summary = orch.generate_all().await.unwrap();
    assert_eq!(summary.outcome, RunOutcome::OutlineReplaced);
    assert_eq!(summary.total_failed, 0);
    let outline = orch.outline();
    assert_eq!(outline.len(), 2);
    assert!(outline.points.iter().all(|p| p.error_detail.is_none()));
}

#[tokio::test(start_paused = true)]
async fn overlapping_generation_is_rejected() {
    let service = ScriptedService::new();
    service.set_delay(Duration::from_secs(1));
    let orch = orchestrator_for(&service, &flat_outline(3));
    let id = orch.outline().points[0].id;

    let (run, single) = tokio::join!(orch.generate_all(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        orch.generate_single(id).await
    });
    assert_eq!(run.unwrap().outcome, RunOutcome::Completed);
    assert!(matches!(single, Err(ApiError::GenerationInProgress)));
    assert!(!orch.is_generating());
}

#[tokio::test]
async fn single_point_retry_moves_failed_to_done() {
    let service = ScriptedService::new();
    service.push_reply(Reply::Fail("timeout upstream".to_string()));
    let orch = orchestrator_for(&service, &flat_outline(3));
    let id = orch.outline().points[2].id;

    let first = orch.generate_single(id).await.unwrap();
    assert!(matches!(first, SingleOutcome::Failed(ref m) if m.contains("timeout upstream")));
    assert_eq!(orch.outline().points[2].state, PointState::Failed);
    assert_eq!(orch.outline().points[0].state, PointState::Pending);

    assert_eq!(orch.generate_single(id).await.unwrap(), SingleOutcome::Generated);
    let point = orch.outline().points[2].clone();
    assert_eq!(point.state, PointState::Done);
    assert_eq!(point.content, "Single section prose.");
    assert!(service.prompts()[1].contains("substantive conclusion"));
}
