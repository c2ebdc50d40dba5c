//! Concurrent event submission through the dispatcher.

use super::helpers::{Reconciler, TestTask, seq};
use rstest::rstest;
use taskwarden::task::{
    domain::{AgentEventKind, InboundEvent, InternalState, TaskSnapshot},
    services::{DispatchError, Dispatcher},
};

fn agent(task: &TestTask, sequence: u64, kind: AgentEventKind) -> InboundEvent {
    InboundEvent::Agent {
        task_id: task.id.clone(),
        event: seq(sequence, kind),
        context: task.context.clone(),
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_sources_reconcile_each_task() -> Result<(), eyre::Report> {
    let (reconciler, tasks) = Reconciler::new(&["001-alpha", "002-beta", "003-gamma"]);
    let Reconciler {
        controller, store, ..
    } = reconciler;
    let dispatcher = Dispatcher::spawn(controller);

    let mut producers = Vec::new();
    for task in &tasks {
        let handle = dispatcher.handle();
        let events = vec![
            agent(task, 1, AgentEventKind::PlanningStarted),
            agent(task, 2, AgentEventKind::PlanReady),
            agent(task, 3, AgentEventKind::PlanApproved),
            agent(task, 3, AgentEventKind::PlanReady),
            agent(task, 4, AgentEventKind::AllSubtasksDone),
        ];
        producers.push(tokio::spawn(async move {
            for event in events {
                handle.submit(event)?;
                tokio::task::yield_now().await;
            }
            Ok::<(), DispatchError>(())
        }));
    }
    for producer in producers {
        producer.await??;
    }

    let controller = dispatcher.shutdown().await?;
    for task in &tasks {
        let state = controller.snapshot(&task.id).map(TaskSnapshot::state);
        eyre::ensure!(
            state == Some(InternalState::QaReview),
            "{} ended in {state:?}",
            task.id
        );
        eyre::ensure!(
            store.write_count(task.context.record_location()) == 4,
            "{} should have four writes",
            task.id
        );
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn shutdown_drains_events_from_live_handles() -> Result<(), eyre::Report> {
    let (reconciler, tasks) = Reconciler::new(&["001-late"]);
    let task = tasks
        .first()
        .ok_or_else(|| eyre::eyre!("expected one task"))?;
    let dispatcher = Dispatcher::spawn(reconciler.controller);
    let handle = dispatcher.handle();

    handle.submit(agent(task, 1, AgentEventKind::PlanningStarted))?;
    let shutdown = tokio::spawn(dispatcher.shutdown());
    drop(handle);
    let controller = shutdown.await??;

    eyre::ensure!(
        controller.snapshot(&task.id).map(TaskSnapshot::state) == Some(InternalState::Planning),
        "queued event should be applied before shutdown completes"
    );
    Ok(())
}
