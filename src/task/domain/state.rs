//! Internal lifecycle states, public statuses, and task snapshots.

use super::{
    ParseInternalStateError, ParsePublicStatusError, ParseReviewReasonError, PullRequestUrl,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fine-grained lifecycle state owned by a task's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InternalState {
    /// Task exists but no work has started.
    Backlog,
    /// The agent is producing an implementation plan.
    Planning,
    /// The agent is implementing subtasks.
    Coding,
    /// A plan is waiting for human approval.
    PlanReview,
    /// The agent is reviewing its own work.
    QaReview,
    /// The agent is addressing QA findings.
    QaFixing,
    /// Work is paused waiting on a human decision.
    HumanReview,
    /// Work stopped on a failure.
    Error,
    /// QA passed and a pull request is being prepared.
    CreatingPr,
    /// A pull request has been opened.
    PrCreated,
    /// Task is complete.
    Done,
}

impl InternalState {
    /// Every internal state, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Backlog,
        Self::Planning,
        Self::Coding,
        Self::PlanReview,
        Self::QaReview,
        Self::QaFixing,
        Self::HumanReview,
        Self::Error,
        Self::CreatingPr,
        Self::PrCreated,
        Self::Done,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::Planning => "planning",
            Self::Coding => "coding",
            Self::PlanReview => "plan_review",
            Self::QaReview => "qa_review",
            Self::QaFixing => "qa_fixing",
            Self::HumanReview => "human_review",
            Self::Error => "error",
            Self::CreatingPr => "creating_pr",
            Self::PrCreated => "pr_created",
            Self::Done => "done",
        }
    }

    /// Returns whether an agent process is expected to be running.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(
            self,
            Self::Planning | Self::Coding | Self::QaReview | Self::QaFixing
        )
    }
}

impl fmt::Display for InternalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for InternalState {
    type Error = ParseInternalStateError;

    fn try_from(value: &str) -> Result<Self, ParseInternalStateError> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == normalized)
            .ok_or_else(|| ParseInternalStateError(value.to_owned()))
    }
}

/// Qualifier explaining why a task needs human attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewReason {
    /// A plan awaits approval.
    PlanReview,
    /// A human rejected work that had passed QA.
    QaRejected,
    /// Work passed QA and awaits final review.
    Completed,
    /// Work stopped on an error.
    Errors,
    /// A human paused running work.
    Stopped,
}

impl ReviewReason {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PlanReview => "plan_review",
            Self::QaRejected => "qa_rejected",
            Self::Completed => "completed",
            Self::Errors => "errors",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for ReviewReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ReviewReason {
    type Error = ParseReviewReasonError;

    fn try_from(value: &str) -> Result<Self, ParseReviewReasonError> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "plan_review" => Ok(Self::PlanReview),
            "qa_rejected" => Ok(Self::QaRejected),
            "completed" => Ok(Self::Completed),
            "errors" => Ok(Self::Errors),
            "stopped" => Ok(Self::Stopped),
            _ => Err(ParseReviewReasonError(value.to_owned())),
        }
    }
}

/// Coarse status persisted to disk and shown outside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicStatus {
    /// Not started.
    Backlog,
    /// Waiting for an execution slot.
    Queue,
    /// An agent is planning or coding.
    InProgress,
    /// An agent is reviewing or fixing its own work.
    AiReview,
    /// A human needs to act; see the accompanying review reason.
    HumanReview,
    /// A pull request exists.
    PrCreated,
    /// Complete.
    Done,
    /// Failed.
    Error,
}

impl PublicStatus {
    /// Every public status, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Backlog,
        Self::Queue,
        Self::InProgress,
        Self::AiReview,
        Self::HumanReview,
        Self::PrCreated,
        Self::Done,
        Self::Error,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::Queue => "queue",
            Self::InProgress => "in_progress",
            Self::AiReview => "ai_review",
            Self::HumanReview => "human_review",
            Self::PrCreated => "pr_created",
            Self::Done => "done",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for PublicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for PublicStatus {
    type Error = ParsePublicStatusError;

    fn try_from(value: &str) -> Result<Self, ParsePublicStatusError> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParsePublicStatusError(value.to_owned()))
    }
}

/// The `(status, reviewReason)` pair written to persisted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    /// Coarse public status.
    pub status: PublicStatus,
    /// Review qualifier, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_reason: Option<ReviewReason>,
}

impl StatusRecord {
    /// Creates a record without a review reason.
    #[must_use]
    pub const fn new(status: PublicStatus) -> Self {
        Self {
            status,
            review_reason: None,
        }
    }

    /// Creates a record with a review reason.
    #[must_use]
    pub const fn with_reason(status: PublicStatus, review_reason: ReviewReason) -> Self {
        Self {
            status,
            review_reason: Some(review_reason),
        }
    }
}

impl fmt::Display for StatusRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.review_reason {
            Some(reason) => write!(f, "{}{{{reason}}}", self.status),
            None => write!(f, "{}", self.status),
        }
    }
}

/// Category of failure that moved a task into [`InternalState::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskErrorKind {
    /// Planning failed.
    PlanningFailed,
    /// Coding failed.
    CodingFailed,
    /// QA exhausted its iteration budget.
    QaMaxIterations,
    /// The QA agent itself failed.
    QaAgentError,
    /// The agent process exited before reaching a terminal outcome.
    UnexpectedExit,
}

/// Failure details attached to a task in the error state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskError {
    kind: TaskErrorKind,
    exit_code: Option<i32>,
    message: Option<String>,
}

impl TaskError {
    /// Creates failure details reported by the agent.
    #[must_use]
    pub const fn reported(kind: TaskErrorKind, message: Option<String>) -> Self {
        Self {
            kind,
            exit_code: None,
            message,
        }
    }

    /// Creates failure details for an unexpected process exit.
    #[must_use]
    pub const fn unexpected_exit(exit_code: Option<i32>) -> Self {
        Self {
            kind: TaskErrorKind::UnexpectedExit,
            exit_code,
            message: None,
        }
    }

    /// Returns the failure category.
    #[must_use]
    pub const fn kind(&self) -> TaskErrorKind {
        self.kind
    }

    /// Returns whether the failure came from an unexpected process exit.
    #[must_use]
    pub const fn is_unexpected(&self) -> bool {
        matches!(self.kind, TaskErrorKind::UnexpectedExit)
    }

    /// Returns the process exit code, if known.
    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Returns the agent-supplied failure message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Complete machine state: the internal state plus its attached context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    state: InternalState,
    review_reason: Option<ReviewReason>,
    error: Option<TaskError>,
    pr_url: Option<PullRequestUrl>,
}

impl TaskSnapshot {
    /// Returns the initial snapshot for a fresh task.
    #[must_use]
    pub const fn initial() -> Self {
        Self::at(InternalState::Backlog)
    }

    /// Returns a snapshot in `state` with no attached context.
    #[must_use]
    pub const fn at(state: InternalState) -> Self {
        Self {
            state,
            review_reason: None,
            error: None,
            pr_url: None,
        }
    }

    /// Returns the internal state.
    #[must_use]
    pub const fn state(&self) -> InternalState {
        self.state
    }

    /// Returns the attached review reason.
    #[must_use]
    pub const fn review_reason(&self) -> Option<ReviewReason> {
        self.review_reason
    }

    /// Returns failure details when the task is in the error state.
    #[must_use]
    pub const fn error(&self) -> Option<&TaskError> {
        self.error.as_ref()
    }

    /// Returns the pull request URL once one has been confirmed.
    #[must_use]
    pub const fn pr_url(&self) -> Option<&PullRequestUrl> {
        self.pr_url.as_ref()
    }

    /// Moves to `state`, clearing context that only belongs to the state
    /// being left.
    #[must_use]
    pub(crate) fn moved_to(&self, state: InternalState) -> Self {
        Self {
            state,
            review_reason: None,
            error: None,
            pr_url: self.pr_url.clone(),
        }
    }

    #[must_use]
    pub(crate) fn with_review_reason(mut self, reason: Option<ReviewReason>) -> Self {
        self.review_reason = reason;
        self
    }

    #[must_use]
    pub(crate) fn with_error(mut self, error: TaskError) -> Self {
        self.error = Some(error);
        self
    }

    #[must_use]
    pub(crate) fn with_pr_url(mut self, pr_url: PullRequestUrl) -> Self {
        self.pr_url = Some(pr_url);
        self
    }
}

impl Default for TaskSnapshot {
    fn default() -> Self {
        Self::initial()
    }
}
