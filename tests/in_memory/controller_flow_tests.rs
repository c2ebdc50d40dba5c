//! End-to-end task lifecycles through the controller.

use super::helpers::{Reconciler, TestTask, seq, single};
use eyre::ensure;
use rstest::rstest;
use taskwarden::task::domain::{
    AgentEventKind, InboundEvent, InternalState, ManualEvent, PublicStatus, PullRequestUrl,
    ReviewReason, StatusRecord,
};

fn statuses(reconciler: &Reconciler, task: &TestTask) -> Vec<StatusRecord> {
    reconciler
        .observer
        .changes_for(&task.id)
        .iter()
        .map(taskwarden::task::ports::StatusChange::record)
        .collect()
}

#[rstest]
fn full_lifecycle_reaches_done(single: (Reconciler, TestTask)) -> Result<(), eyre::Report> {
    let (mut reconciler, task) = single;
    let pr_url = PullRequestUrl::new("https://git.example/pr/3")?;
    let events = [
        AgentEventKind::PlanningStarted,
        AgentEventKind::PlanReady,
        AgentEventKind::PlanApproved,
        AgentEventKind::SubtaskCompleted {
            subtask_id: Some("1".to_owned()),
        },
        AgentEventKind::AllSubtasksDone,
        AgentEventKind::QaFailed {
            issues: vec!["flaky test".to_owned()],
        },
        AgentEventKind::QaFixingComplete,
        AgentEventKind::QaPassed,
    ];
    for (index, kind) in events.into_iter().enumerate() {
        let sequence = u64::try_from(index)? + 1;
        reconciler
            .controller
            .handle_agent_event(&task.id, seq(sequence, kind), task.context.clone());
    }
    reconciler.controller.handle_manual_event(
        &task.id,
        ManualEvent::PrCreated {
            pr_url: pr_url.clone(),
        },
        task.context.clone(),
    );
    reconciler
        .controller
        .handle_manual_event(&task.id, ManualEvent::MarkDone, task.context.clone());

    let snapshot = reconciler
        .controller
        .snapshot(&task.id)
        .ok_or_else(|| eyre::eyre!("task should be live"))?;
    ensure!(snapshot.state() == InternalState::Done, "expected done");
    ensure!(snapshot.pr_url() == Some(&pr_url), "pull request url kept");
    ensure!(
        statuses(&reconciler, &task)
            == vec![
                StatusRecord::new(PublicStatus::InProgress),
                StatusRecord::with_reason(PublicStatus::HumanReview, ReviewReason::PlanReview),
                StatusRecord::new(PublicStatus::InProgress),
                StatusRecord::new(PublicStatus::AiReview),
                StatusRecord::with_reason(PublicStatus::HumanReview, ReviewReason::Completed),
                StatusRecord::new(PublicStatus::PrCreated),
                StatusRecord::new(PublicStatus::Done),
            ],
        "unexpected status history: {:?}",
        statuses(&reconciler, &task)
    );
    ensure!(
        reconciler.store.write_count(task.context.record_location()) == 7,
        "one write per public status change"
    );
    Ok(())
}

#[rstest]
fn existing_mirror_receives_every_change(single: (Reconciler, TestTask)) {
    let (mut reconciler, task) = single;
    reconciler
        .store
        .add_location(task.mirror.clone())
        .expect("register mirror location");

    reconciler.controller.handle_agent_event(
        &task.id,
        seq(1, AgentEventKind::CodingStarted),
        task.context.clone(),
    );
    reconciler.controller.handle_agent_event(
        &task.id,
        seq(2, AgentEventKind::CodingFailed {
            error: Some("compile error".to_owned()),
        }),
        task.context.clone(),
    );

    let expected = StatusRecord::with_reason(PublicStatus::HumanReview, ReviewReason::Errors);
    assert_eq!(reconciler.store.record_at(&task.mirror), Some(expected));
    assert_eq!(
        reconciler.store.record_at(task.context.record_location()),
        Some(expected)
    );
    assert_eq!(reconciler.store.write_count(&task.mirror), 2);
}

#[rstest]
fn stale_replay_after_progress_is_ignored(single: (Reconciler, TestTask)) {
    let (mut reconciler, task) = single;
    for (sequence, kind) in [
        (1, AgentEventKind::PlanningStarted),
        (2, AgentEventKind::PlanReady),
        (3, AgentEventKind::PlanApproved),
    ] {
        reconciler
            .controller
            .handle_agent_event(&task.id, seq(sequence, kind), task.context.clone());
    }

    let replayed = reconciler.controller.handle_agent_event(
        &task.id,
        seq(2, AgentEventKind::PlanReady),
        task.context.clone(),
    );

    assert!(!replayed);
    assert_eq!(
        reconciler
            .controller
            .snapshot(&task.id)
            .map(taskwarden::task::domain::TaskSnapshot::state),
        Some(InternalState::Coding)
    );
    assert_eq!(reconciler.controller.sequencer().last_sequence(&task.id), Some(3));
}

#[rstest]
fn stopping_and_reopening_round_trips_through_backlog(single: (Reconciler, TestTask)) {
    let (mut reconciler, task) = single;
    let context = task.context.clone();
    reconciler
        .controller
        .handle_manual_status_change(&task.id, PublicStatus::InProgress, context.clone());
    reconciler
        .controller
        .handle_manual_status_change(&task.id, PublicStatus::HumanReview, context.clone());
    reconciler
        .controller
        .handle_manual_status_change(&task.id, PublicStatus::Done, context.clone());
    reconciler
        .controller
        .handle_manual_status_change(&task.id, PublicStatus::Backlog, context);

    assert_eq!(
        statuses(&reconciler, &task),
        vec![
            StatusRecord::new(PublicStatus::InProgress),
            StatusRecord::with_reason(PublicStatus::HumanReview, ReviewReason::Stopped),
            StatusRecord::new(PublicStatus::Done),
            StatusRecord::new(PublicStatus::Backlog),
        ]
    );
}

#[rstest]
fn envelopes_drive_the_same_handlers(single: (Reconciler, TestTask)) {
    let (mut reconciler, task) = single;
    let envelopes = vec![
        InboundEvent::Agent {
            task_id: task.id.clone(),
            event: seq(1, AgentEventKind::PlanningStarted),
            context: task.context.clone(),
        },
        InboundEvent::ProcessExit {
            task_id: task.id.clone(),
            exit_code: Some(137),
            context: None,
        },
        InboundEvent::Manual {
            task_id: task.id.clone(),
            event: ManualEvent::Resume,
            context: task.context.clone(),
        },
        InboundEvent::StatusChange {
            task_id: task.id.clone(),
            target: PublicStatus::Backlog,
            context: task.context.clone(),
        },
    ];

    let applied: Vec<bool> = envelopes
        .into_iter()
        .map(|envelope| reconciler.controller.apply(envelope))
        .collect();

    assert_eq!(applied, vec![true, true, true, true]);
    assert_eq!(
        reconciler.store.record_at(task.context.record_location()),
        Some(StatusRecord::new(PublicStatus::Backlog))
    );
}

#[rstest]
fn one_failing_task_does_not_disturb_another() {
    let (mut reconciler, tasks) = Reconciler::new(&["001-alpha", "002-beta"]);
    let [alpha, beta] = <[TestTask; 2]>::try_from(tasks)
        .unwrap_or_else(|_| panic!("expected two tasks"));
    reconciler
        .store
        .fail_writes_to(alpha.context.record_location().clone())
        .expect("fail alpha writes");

    reconciler.controller.handle_agent_event(
        &alpha.id,
        seq(1, AgentEventKind::PlanReady),
        alpha.context.clone(),
    );
    reconciler.controller.handle_agent_event(
        &beta.id,
        seq(1, AgentEventKind::PlanReady),
        beta.context.clone(),
    );

    assert_eq!(reconciler.store.record_at(alpha.context.record_location()), None);
    assert_eq!(
        reconciler.store.record_at(beta.context.record_location()),
        Some(StatusRecord::with_reason(
            PublicStatus::HumanReview,
            ReviewReason::PlanReview
        ))
    );
    assert_eq!(reconciler.observer.changes().len(), 2);
}
