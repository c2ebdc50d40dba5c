//! Then steps for task reconciliation BDD scenarios.

use super::world::ReconciliationWorld;
use rstest_bdd_macros::then;
use taskwarden::task::domain::{InternalState, PublicStatus, ReviewReason, StatusRecord};

fn persisted(world: &ReconciliationWorld) -> Result<Option<StatusRecord>, eyre::Report> {
    let (_, context) = world.task()?;
    Ok(world.store.record_at(context.record_location()))
}

#[then(r#"the task state is "{state}""#)]
fn task_state_is(world: &ReconciliationWorld, state: String) -> Result<(), eyre::Report> {
    let expected = InternalState::try_from(state.as_str())?;
    let (task_id, _) = world.task()?;
    let snapshot = world
        .controller
        .snapshot(&task_id)
        .ok_or_else(|| eyre::eyre!("task {task_id} has no live machine"))?;

    if snapshot.state() != expected {
        return Err(eyre::eyre!(
            "expected state {expected}, found {}",
            snapshot.state()
        ));
    }
    Ok(())
}

#[then(r#"the persisted status is "{status}" with reason "{reason}""#)]
fn persisted_status_with_reason(
    world: &ReconciliationWorld,
    status: String,
    reason: String,
) -> Result<(), eyre::Report> {
    let expected = StatusRecord::with_reason(
        PublicStatus::try_from(status.as_str())?,
        ReviewReason::try_from(reason.as_str())?,
    );
    let actual = persisted(world)?;
    eyre::ensure!(
        actual == Some(expected),
        "expected {expected}, found {actual:?}"
    );
    Ok(())
}

#[then(r#"the persisted status is "{status}" without a reason"#)]
fn persisted_status_without_reason(
    world: &ReconciliationWorld,
    status: String,
) -> Result<(), eyre::Report> {
    let expected = StatusRecord::new(PublicStatus::try_from(status.as_str())?);
    let actual = persisted(world)?;
    eyre::ensure!(
        actual == Some(expected),
        "expected {expected}, found {actual:?}"
    );
    Ok(())
}

#[then("the task record has {count:usize} writes")]
fn task_record_writes(world: &ReconciliationWorld, count: usize) -> Result<(), eyre::Report> {
    let (_, context) = world.task()?;
    let actual = world.store.write_count(context.record_location());
    eyre::ensure!(actual == count, "expected {count} writes, found {actual}");
    Ok(())
}

#[then("observers were notified {count:usize} times")]
fn observers_notified(world: &ReconciliationWorld, count: usize) -> Result<(), eyre::Report> {
    let (task_id, _) = world.task()?;
    let actual = world.observer.changes_for(&task_id).len();
    eyre::ensure!(
        actual == count,
        "expected {count} notifications, found {actual}"
    );
    Ok(())
}

#[then("the failure is marked as an unexpected exit")]
fn failure_is_unexpected(world: &ReconciliationWorld) -> Result<(), eyre::Report> {
    let (task_id, _) = world.task()?;
    let unexpected = world
        .controller
        .snapshot(&task_id)
        .and_then(|snapshot| snapshot.error())
        .is_some_and(taskwarden::task::domain::TaskError::is_unexpected);
    eyre::ensure!(unexpected, "task error should record an unexpected exit");
    Ok(())
}
