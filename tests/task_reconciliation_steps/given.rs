//! Given steps for task reconciliation BDD scenarios.

use super::world::ReconciliationWorld;
use rstest_bdd_macros::given;
use taskwarden::task::domain::{PublicStatus, ReviewReason, StatusRecord};

#[given(r#"a fresh task "{name}""#)]
fn fresh_task(world: &mut ReconciliationWorld, name: String) -> Result<(), eyre::Report> {
    world.register_task(&name)?;
    Ok(())
}

#[given(r#"a task "{name}" last persisted as "{status}""#)]
fn task_last_persisted_as(
    world: &mut ReconciliationWorld,
    name: String,
    status: String,
) -> Result<(), eyre::Report> {
    let parsed = PublicStatus::try_from(status.as_str())?;
    let context = world.register_task(&name)?;
    let task_id = world.task()?.0;
    world.task = Some((task_id, context.with_persisted(StatusRecord::new(parsed))));
    Ok(())
}

#[given(r#"a task "{name}" awaiting review for "{reason}""#)]
fn task_awaiting_review(
    world: &mut ReconciliationWorld,
    name: String,
    reason: String,
) -> Result<(), eyre::Report> {
    let parsed = ReviewReason::try_from(reason.as_str())?;
    let context = world.register_task(&name)?;
    let task_id = world.task()?.0;
    world.task = Some((
        task_id,
        context.with_persisted(StatusRecord::with_reason(PublicStatus::HumanReview, parsed)),
    ));
    Ok(())
}
