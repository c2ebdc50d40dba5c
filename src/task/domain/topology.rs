//! Declarative task lifecycle topology and the per-task state machine.

use super::{
    AgentEventKind, InternalState, ManualEvent, PublicStatus, ReviewReason, TaskError,
    TaskErrorKind, TaskEvent, TaskSnapshot, project_snapshot,
};
use serde::{Deserialize, Serialize};

/// Where a task goes once QA approves its work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QaPassTarget {
    /// Wait for a pull request to be opened.
    #[default]
    CreatingPr,
    /// Finish the task immediately.
    Done,
}

impl QaPassTarget {
    const fn state(self) -> InternalState {
        match self {
            Self::CreatingPr => InternalState::CreatingPr,
            Self::Done => InternalState::Done,
        }
    }
}

/// Static transition table shared by every task machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Topology {
    qa_pass_target: QaPassTarget,
}

impl Topology {
    /// Creates a topology routing QA approval to `qa_pass_target`.
    #[must_use]
    pub const fn new(qa_pass_target: QaPassTarget) -> Self {
        Self { qa_pass_target }
    }

    /// Returns the QA approval target.
    #[must_use]
    pub const fn qa_pass_target(self) -> QaPassTarget {
        self.qa_pass_target
    }

    /// Computes the snapshot that follows `event`.
    ///
    /// Returns `None` when the event is not defined for the current state or
    /// leaves the snapshot unchanged.
    #[must_use]
    pub fn next(self, current: &TaskSnapshot, event: &TaskEvent) -> Option<TaskSnapshot> {
        let next = match event {
            TaskEvent::Agent(kind) => self.on_agent(current, kind),
            TaskEvent::Manual(manual) => on_manual(current, manual),
            TaskEvent::ProcessExited { exit_code } => current
                .state()
                .is_active()
                .then(|| {
                    current
                        .moved_to(InternalState::Error)
                        .with_error(TaskError::unexpected_exit(*exit_code))
                }),
        }?;
        (next != *current).then_some(next)
    }

    fn on_agent(self, current: &TaskSnapshot, kind: &AgentEventKind) -> Option<TaskSnapshot> {
        use InternalState as S;

        let state = current.state();
        let target = match (state, kind) {
            (S::Backlog | S::HumanReview | S::Error, AgentEventKind::PlanningStarted) => {
                S::Planning
            }
            (S::Backlog | S::Planning, AgentEventKind::PlanReady) => S::PlanReview,
            (
                S::Backlog | S::Planning | S::PlanReview | S::HumanReview | S::Error,
                AgentEventKind::CodingStarted,
            )
            | (S::Planning | S::PlanReview, AgentEventKind::PlanApproved) => S::Coding,
            (S::Coding, AgentEventKind::AllSubtasksDone | AgentEventKind::QaStarted)
            | (S::QaFixing, AgentEventKind::QaFixingComplete) => S::QaReview,
            (S::QaReview, AgentEventKind::QaPassed) => self.qa_pass_target.state(),
            (S::QaReview, AgentEventKind::QaFailed { .. }) => S::QaFixing,
            (S::CreatingPr, AgentEventKind::PrCreated { pr_url }) => {
                return Some(current.moved_to(S::PrCreated).with_pr_url(pr_url.clone()));
            }
            (S::Planning, AgentEventKind::PlanningFailed { error }) => {
                return Some(failed(current, TaskErrorKind::PlanningFailed, error.clone()));
            }
            (S::Coding, AgentEventKind::CodingFailed { error }) => {
                return Some(failed(current, TaskErrorKind::CodingFailed, error.clone()));
            }
            (S::QaReview | S::QaFixing, AgentEventKind::QaMaxIterations { iterations }) => {
                let message =
                    iterations.map(|count| format!("QA gave up after {count} iterations"));
                return Some(failed(current, TaskErrorKind::QaMaxIterations, message));
            }
            (S::QaReview | S::QaFixing, AgentEventKind::QaAgentError { error }) => {
                return Some(failed(current, TaskErrorKind::QaAgentError, error.clone()));
            }
            _ => return None,
        };
        Some(current.moved_to(target))
    }
}

fn on_manual(current: &TaskSnapshot, event: &ManualEvent) -> Option<TaskSnapshot> {
    use InternalState as S;

    let state = current.state();
    match (state, event) {
        (S::Backlog, ManualEvent::Resume) | (S::PlanReview, ManualEvent::Reject) => {
            Some(current.moved_to(S::Planning))
        }
        (S::Planning | S::PlanReview, ManualEvent::ApprovePlan)
        | (S::PlanReview | S::HumanReview | S::Error | S::CreatingPr, ManualEvent::Resume) => {
            Some(current.moved_to(S::Coding))
        }
        (S::CreatingPr, ManualEvent::PrCreated { pr_url }) => {
            Some(current.moved_to(S::PrCreated).with_pr_url(pr_url.clone()))
        }
        (S::CreatingPr, ManualEvent::Reject) => Some(
            current
                .moved_to(S::HumanReview)
                .with_review_reason(Some(ReviewReason::QaRejected)),
        ),
        (_, ManualEvent::RequestReview) if state.is_active() => Some(
            current
                .moved_to(S::HumanReview)
                .with_review_reason(Some(ReviewReason::Stopped)),
        ),
        (S::Done, ManualEvent::Reopen) => Some(current.moved_to(S::Backlog)),
        (S::Done, _) => None,
        (_, ManualEvent::Stop) => Some(current.moved_to(S::Backlog)),
        (
            S::PlanReview | S::HumanReview | S::Error | S::CreatingPr | S::PrCreated,
            ManualEvent::MarkDone,
        ) => Some(current.moved_to(S::Done)),
        _ => None,
    }
}

fn failed(current: &TaskSnapshot, kind: TaskErrorKind, message: Option<String>) -> TaskSnapshot {
    current
        .moved_to(InternalState::Error)
        .with_error(TaskError::reported(kind, message))
}

/// Chooses the manual event that moves a task toward `target`.
///
/// Moving to `in_progress` approves the plan when the task is waiting on plan
/// review and resumes it otherwise. Moving to `backlog` reopens completed
/// tasks and stops all others. Returns `None` for targets that cannot be set
/// directly.
#[must_use]
pub fn manual_event_for_status(target: PublicStatus, current: &TaskSnapshot) -> Option<ManualEvent> {
    match target {
        PublicStatus::InProgress => {
            let awaiting_plan_review =
                project_snapshot(current).review_reason == Some(ReviewReason::PlanReview);
            Some(if awaiting_plan_review {
                ManualEvent::ApprovePlan
            } else {
                ManualEvent::Resume
            })
        }
        PublicStatus::Backlog => Some(if current.state() == InternalState::Done {
            ManualEvent::Reopen
        } else {
            ManualEvent::Stop
        }),
        PublicStatus::HumanReview => Some(ManualEvent::RequestReview),
        PublicStatus::Done => Some(ManualEvent::MarkDone),
        PublicStatus::Queue
        | PublicStatus::AiReview
        | PublicStatus::PrCreated
        | PublicStatus::Error => None,
    }
}

/// Change produced by a task machine in response to one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    from: InternalState,
    snapshot: TaskSnapshot,
}

impl Transition {
    /// Returns the state before the event.
    #[must_use]
    pub const fn from(&self) -> InternalState {
        self.from
    }

    /// Returns the state after the event.
    #[must_use]
    pub const fn to(&self) -> InternalState {
        self.snapshot.state()
    }

    /// Returns the full snapshot after the event.
    #[must_use]
    pub const fn snapshot(&self) -> &TaskSnapshot {
        &self.snapshot
    }
}

/// Live state machine instance for one task.
///
/// All mutation of the task's snapshot goes through [`TaskMachine::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskMachine {
    topology: Topology,
    snapshot: TaskSnapshot,
    stopped: bool,
}

impl TaskMachine {
    /// Creates a machine in the initial `backlog` state.
    #[must_use]
    pub const fn new(topology: Topology) -> Self {
        Self::resume_from(topology, TaskSnapshot::initial())
    }

    /// Creates a machine starting from `snapshot`, typically one rebuilt from
    /// a persisted record.
    #[must_use]
    pub const fn resume_from(topology: Topology, snapshot: TaskSnapshot) -> Self {
        Self {
            topology,
            snapshot,
            stopped: false,
        }
    }

    /// Returns the current snapshot.
    #[must_use]
    pub const fn snapshot(&self) -> &TaskSnapshot {
        &self.snapshot
    }

    /// Returns the current internal state.
    #[must_use]
    pub const fn state(&self) -> InternalState {
        self.snapshot.state()
    }

    /// Returns whether the machine has been stopped.
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Delivers `event`, returning the resulting transition if the snapshot
    /// changed. Stopped machines ignore every event.
    pub fn send(&mut self, event: &TaskEvent) -> Option<Transition> {
        if self.stopped {
            return None;
        }
        let next = self.topology.next(&self.snapshot, event)?;
        let from = self.snapshot.state();
        self.snapshot = next;
        Some(Transition {
            from,
            snapshot: self.snapshot.clone(),
        })
    }

    /// Stops the machine; later events are ignored.
    pub const fn stop(&mut self) {
        self.stopped = true;
    }
}
