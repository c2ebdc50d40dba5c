//! When steps for task reconciliation BDD scenarios.

use super::world::ReconciliationWorld;
use rstest_bdd_macros::when;
use serde_json::json;
use taskwarden::task::domain::{AgentEvent, PublicStatus};

#[when(r#"the agent reports "{kind}" with sequence {sequence:u64}"#)]
fn agent_reports(
    world: &mut ReconciliationWorld,
    kind: String,
    sequence: u64,
) -> Result<(), eyre::Report> {
    let event: AgentEvent = serde_json::from_value(json!({"type": kind, "sequence": sequence}))?;
    let (task_id, context) = world.task()?;
    world.controller.handle_agent_event(&task_id, event, context);
    Ok(())
}

#[when("the agent process exits with code {code:i32}")]
fn process_exits(world: &mut ReconciliationWorld, code: i32) -> Result<(), eyre::Report> {
    let (task_id, context) = world.task()?;
    world
        .controller
        .handle_process_exit(&task_id, Some(code), Some(context));
    Ok(())
}

#[when(r#"the user moves the task to "{target}""#)]
fn user_moves_task(world: &mut ReconciliationWorld, target: String) -> Result<(), eyre::Report> {
    let parsed = PublicStatus::try_from(target.as_str())?;
    let (task_id, context) = world.task()?;
    let handled = world
        .controller
        .handle_manual_status_change(&task_id, parsed, context);
    eyre::ensure!(handled, "status target {target} was not supported");
    Ok(())
}
