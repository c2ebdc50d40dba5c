//! Lifecycle event vocabulary consumed by task state machines.
//!
//! Agent events arrive from the out-of-process agent as JSON objects tagged by
//! `type`, optionally carrying a per-task `sequence` number. Manual events come
//! from the user interface and are never sequenced. Process exits are reported
//! by process supervision and enter the machine as
//! [`TaskEvent::ProcessExited`].

use super::PullRequestUrl;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default marker prefixing event lines in agent output.
pub const DEFAULT_EVENT_LINE_PREFIX: &str = "__TASK_EVENT__:";

/// Event emitted by the agent process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentEvent {
    /// Per-task monotonic sequence number; absent for unsequenced events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,
    /// Event type and payload.
    #[serde(flatten)]
    pub kind: AgentEventKind,
}

impl AgentEvent {
    /// Creates a sequenced agent event.
    #[must_use]
    pub const fn sequenced(sequence: u64, kind: AgentEventKind) -> Self {
        Self {
            sequence: Some(sequence),
            kind,
        }
    }

    /// Creates an agent event that bypasses sequence checks.
    #[must_use]
    pub const fn unsequenced(kind: AgentEventKind) -> Self {
        Self {
            sequence: None,
            kind,
        }
    }
}

/// Agent event types and their payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentEventKind {
    /// The planner started.
    PlanningStarted,
    /// A plan is ready for human review.
    PlanReady,
    /// The plan was approved on the agent side.
    PlanApproved,
    /// Planning failed.
    PlanningFailed {
        /// Failure description.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// The coder started.
    CodingStarted,
    /// One subtask finished.
    #[serde(rename_all = "camelCase")]
    SubtaskCompleted {
        /// Identifier of the finished subtask.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subtask_id: Option<String>,
    },
    /// Every subtask finished.
    AllSubtasksDone,
    /// Coding failed.
    CodingFailed {
        /// Failure description.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// QA review started.
    QaStarted,
    /// QA approved the work.
    QaPassed,
    /// QA rejected the work.
    QaFailed {
        /// Issues reported by QA.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        issues: Vec<String>,
    },
    /// QA fixes were applied and resubmitted.
    QaFixingComplete,
    /// QA gave up after its iteration budget.
    QaMaxIterations {
        /// Number of iterations performed.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        iterations: Option<u32>,
    },
    /// The QA agent failed.
    QaAgentError {
        /// Failure description.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// A pull request was opened by the agent.
    #[serde(rename_all = "camelCase")]
    PrCreated {
        /// Pull request URL.
        pr_url: PullRequestUrl,
    },
}

impl AgentEventKind {
    /// Returns whether this event ends the agent's run, after which an exit of
    /// the agent process is expected rather than a failure.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::PlanningFailed { .. }
                | Self::CodingFailed { .. }
                | Self::AllSubtasksDone
                | Self::QaPassed
                | Self::QaMaxIterations { .. }
                | Self::QaAgentError { .. }
        )
    }

    /// Returns the wire name of the event type.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PlanningStarted => "PLANNING_STARTED",
            Self::PlanReady => "PLAN_READY",
            Self::PlanApproved => "PLAN_APPROVED",
            Self::PlanningFailed { .. } => "PLANNING_FAILED",
            Self::CodingStarted => "CODING_STARTED",
            Self::SubtaskCompleted { .. } => "SUBTASK_COMPLETED",
            Self::AllSubtasksDone => "ALL_SUBTASKS_DONE",
            Self::CodingFailed { .. } => "CODING_FAILED",
            Self::QaStarted => "QA_STARTED",
            Self::QaPassed => "QA_PASSED",
            Self::QaFailed { .. } => "QA_FAILED",
            Self::QaFixingComplete => "QA_FIXING_COMPLETE",
            Self::QaMaxIterations { .. } => "QA_MAX_ITERATIONS",
            Self::QaAgentError { .. } => "QA_AGENT_ERROR",
            Self::PrCreated { .. } => "PR_CREATED",
        }
    }
}

/// Event originating from a user action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ManualEvent {
    /// Approve a plan awaiting review.
    ApprovePlan,
    /// Resume work after review, failure, or from the backlog.
    Resume,
    /// Reject a plan or work that passed QA.
    Reject,
    /// Stop the task and return it to the backlog.
    Stop,
    /// Pause running work for human review.
    RequestReview,
    /// Mark the task complete.
    MarkDone,
    /// Confirm that a pull request was opened.
    #[serde(rename_all = "camelCase")]
    PrCreated {
        /// Pull request URL.
        pr_url: PullRequestUrl,
    },
    /// Reopen a completed task.
    Reopen,
}

impl ManualEvent {
    /// Returns the wire name of the event type.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ApprovePlan => "APPROVE_PLAN",
            Self::Resume => "RESUME",
            Self::Reject => "REJECT",
            Self::Stop => "STOP",
            Self::RequestReview => "REQUEST_REVIEW",
            Self::MarkDone => "MARK_DONE",
            Self::PrCreated { .. } => "PR_CREATED",
            Self::Reopen => "REOPEN",
        }
    }
}

/// Input delivered to a task state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    /// An accepted agent event.
    Agent(AgentEventKind),
    /// A user action.
    Manual(ManualEvent),
    /// The agent process exited before a terminal event was seen.
    ProcessExited {
        /// Exit code, when the process exited normally.
        exit_code: Option<i32>,
    },
}

impl TaskEvent {
    /// Returns the wire name of the event type.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Agent(kind) => kind.name(),
            Self::Manual(event) => event.name(),
            Self::ProcessExited { .. } => "PROCESS_EXITED",
        }
    }
}

/// Errors returned while decoding agent event lines.
#[derive(Debug, Error)]
pub enum EventParseError {
    /// The payload after the marker is not a valid agent event.
    #[error("malformed agent event payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Decodes one line of agent output.
///
/// Returns `Ok(None)` for lines that do not start with `prefix`, which are
/// ordinary agent output.
///
/// # Errors
///
/// Returns [`EventParseError::Payload`] when a marker line carries a payload
/// that is not a valid agent event.
pub fn parse_event_line(line: &str, prefix: &str) -> Result<Option<AgentEvent>, EventParseError> {
    let Some(payload) = line.trim_start().strip_prefix(prefix) else {
        return Ok(None);
    };
    let event = serde_json::from_str(payload.trim())?;
    Ok(Some(event))
}
