//! Registry of live task machines and the entry point for inbound events.

use mockable::Clock;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tracing::{debug, info};

use super::{EventSequencer, StatusFanout};
use crate::task::{
    domain::{
        AgentEvent, InboundEvent, ManualEvent, PublicStatus, StatusRecord, TaskContext, TaskEvent,
        TaskId, TaskMachine, TaskSnapshot, Topology, manual_event_for_status, project_snapshot,
        rehydrate_snapshot,
    },
    ports::{MirrorLocator, StatusObserver, StatusStore},
};

/// Per-task registry state.
///
/// Sequence marks and terminal flags live in the controller's
/// [`EventSequencer`] and are cleared together with the entry.
#[derive(Debug)]
struct ControllerEntry {
    machine: TaskMachine,
    last_emitted: StatusRecord,
    context: TaskContext,
}

impl ControllerEntry {
    fn start(topology: Topology, context: TaskContext) -> Self {
        let snapshot = context
            .persisted()
            .map_or_else(TaskSnapshot::initial, rehydrate_snapshot);
        let last_emitted = context
            .persisted()
            .unwrap_or_else(|| project_snapshot(&snapshot));
        Self {
            machine: TaskMachine::resume_from(topology, snapshot),
            last_emitted,
            context,
        }
    }
}

/// Reconciles agent, manual, and process-exit events into persisted task
/// statuses.
///
/// The controller owns at most one [`TaskMachine`] per task, created lazily on
/// the first event that carries a [`TaskContext`]. Handlers take `&mut self`;
/// callers that receive events concurrently serialize them through
/// [`super::Dispatcher`].
pub struct TaskLifecycleController<S, M, C>
where
    S: StatusStore,
    M: MirrorLocator,
    C: Clock + Send + Sync,
{
    topology: Topology,
    registry: HashMap<TaskId, ControllerEntry>,
    sequencer: EventSequencer,
    fanout: StatusFanout<S, M, C>,
}

impl<S, M, C> TaskLifecycleController<S, M, C>
where
    S: StatusStore,
    M: MirrorLocator,
    C: Clock + Send + Sync,
{
    /// Creates a controller with no live tasks.
    #[must_use]
    pub fn new(topology: Topology, store: Arc<S>, mirrors: Arc<M>, clock: Arc<C>) -> Self {
        Self {
            topology,
            registry: HashMap::new(),
            sequencer: EventSequencer::new(),
            fanout: StatusFanout::new(store, mirrors, clock),
        }
    }

    /// Registers an observer notified on every public status change.
    pub fn subscribe(&mut self, observer: Arc<dyn StatusObserver>) {
        self.fanout.subscribe(observer);
    }

    /// Handles an event from the agent process.
    ///
    /// Returns `false`, with no side effects, when the sequencer rejects the
    /// event as stale or duplicate.
    pub fn handle_agent_event(
        &mut self,
        task_id: &TaskId,
        event: AgentEvent,
        context: TaskContext,
    ) -> bool {
        if !self.sequencer.accept(task_id, event.sequence) {
            debug!(
                %task_id,
                sequence = event.sequence,
                event = event.kind.name(),
                "rejected stale or duplicate agent event"
            );
            return false;
        }
        if event.kind.is_terminal() {
            self.sequencer.mark_terminal(task_id);
        }
        self.deliver(task_id, &TaskEvent::Agent(event.kind), Some(context));
        true
    }

    /// Handles an exit of the task's agent process.
    ///
    /// Exits after a terminal agent event are expected and ignored. Otherwise
    /// the exit is delivered as an unexpected failure, using the cached
    /// context when none is supplied. Returns whether the task's state
    /// changed.
    pub fn handle_process_exit(
        &mut self,
        task_id: &TaskId,
        exit_code: Option<i32>,
        context: Option<TaskContext>,
    ) -> bool {
        if self.sequencer.is_terminal(task_id) {
            debug!(%task_id, ?exit_code, "ignoring process exit after terminal event");
            return false;
        }
        self.deliver(task_id, &TaskEvent::ProcessExited { exit_code }, context)
    }

    /// Handles a user action. Manual events bypass the sequencer.
    ///
    /// Returns whether the task's state changed.
    pub fn handle_manual_event(
        &mut self,
        task_id: &TaskId,
        event: ManualEvent,
        context: TaskContext,
    ) -> bool {
        self.deliver(task_id, &TaskEvent::Manual(event), Some(context))
    }

    /// Translates a request to set the coarse status into the manual event
    /// appropriate for the task's current state and delivers it.
    ///
    /// Returns `false` when `target` cannot be set directly.
    pub fn handle_manual_status_change(
        &mut self,
        task_id: &TaskId,
        target: PublicStatus,
        context: TaskContext,
    ) -> bool {
        let current = self.registry.get(task_id).map_or_else(
            || {
                context
                    .persisted()
                    .map_or_else(TaskSnapshot::initial, rehydrate_snapshot)
            },
            |entry| entry.machine.snapshot().clone(),
        );
        let Some(event) = manual_event_for_status(target, &current) else {
            debug!(%task_id, %target, "unsupported manual status target");
            return false;
        };
        debug!(%task_id, %target, event = event.name(), "translated manual status change");
        self.handle_manual_event(task_id, event, context);
        true
    }

    /// Applies one inbound envelope. Returns the handler's result; removals
    /// report whether a live entry existed.
    pub fn apply(&mut self, inbound: InboundEvent) -> bool {
        match inbound {
            InboundEvent::Agent {
                task_id,
                event,
                context,
            } => self.handle_agent_event(&task_id, event, context),
            InboundEvent::Manual {
                task_id,
                event,
                context,
            } => self.handle_manual_event(&task_id, event, context),
            InboundEvent::StatusChange {
                task_id,
                target,
                context,
            } => self.handle_manual_status_change(&task_id, target, context),
            InboundEvent::ProcessExit {
                task_id,
                exit_code,
                context,
            } => self.handle_process_exit(&task_id, exit_code, context),
            InboundEvent::Remove { task_id } => self.remove(&task_id),
        }
    }

    /// Stops and discards the task's machine together with its sequence
    /// mark, terminal flag, cached context, and last emitted status.
    ///
    /// Later events for the task start from scratch. Returns whether a live
    /// entry existed.
    pub fn remove(&mut self, task_id: &TaskId) -> bool {
        self.sequencer.clear(task_id);
        let Some(mut entry) = self.registry.remove(task_id) else {
            return false;
        };
        entry.machine.stop();
        debug!(%task_id, state = %entry.machine.state(), "removed task machine");
        true
    }

    /// Returns the current snapshot of a live task.
    #[must_use]
    pub fn snapshot(&self, task_id: &TaskId) -> Option<&TaskSnapshot> {
        self.registry
            .get(task_id)
            .map(|entry| entry.machine.snapshot())
    }

    /// Returns the last public status emitted for a live task.
    #[must_use]
    pub fn last_emitted(&self, task_id: &TaskId) -> Option<StatusRecord> {
        self.registry.get(task_id).map(|entry| entry.last_emitted)
    }

    /// Returns whether a machine is live for the task.
    #[must_use]
    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.registry.contains_key(task_id)
    }

    /// Returns the number of live task machines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Returns whether no task machines are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Returns the sequencer state.
    #[must_use]
    pub const fn sequencer(&self) -> &EventSequencer {
        &self.sequencer
    }

    fn deliver(
        &mut self,
        task_id: &TaskId,
        event: &TaskEvent,
        context: Option<TaskContext>,
    ) -> bool {
        let Some(entry) = obtain_entry(&mut self.registry, self.topology, task_id, context) else {
            debug!(%task_id, event = event.name(), "dropping event without task context");
            return false;
        };
        let Some(transition) = entry.machine.send(event) else {
            debug!(
                %task_id,
                state = %entry.machine.state(),
                event = event.name(),
                "event ignored in current state"
            );
            return false;
        };

        let record = project_snapshot(transition.snapshot());
        if record == entry.last_emitted {
            debug!(
                %task_id,
                from = %transition.from(),
                to = %transition.to(),
                "internal transition without public status change"
            );
            return true;
        }

        info!(
            %task_id,
            from = %transition.from(),
            to = %transition.to(),
            status = %record,
            "task status transition"
        );
        entry.last_emitted = record;
        self.fanout.publish(task_id, &entry.context, record);
        true
    }
}

/// Returns the live entry for `task_id`, creating it from `context` when
/// absent. A supplied context replaces the cached one.
fn obtain_entry<'a>(
    registry: &'a mut HashMap<TaskId, ControllerEntry>,
    topology: Topology,
    task_id: &TaskId,
    context: Option<TaskContext>,
) -> Option<&'a mut ControllerEntry> {
    match registry.entry(task_id.clone()) {
        Entry::Occupied(occupied) => {
            let entry = occupied.into_mut();
            if let Some(latest) = context {
                entry.context = latest;
            }
            Some(entry)
        }
        Entry::Vacant(vacant) => {
            let initial = context?;
            Some(vacant.insert(ControllerEntry::start(topology, initial)))
        }
    }
}
