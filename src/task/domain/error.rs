//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task identifier is empty or not usable as a path segment.
    #[error("invalid task identifier '{0}'")]
    InvalidTaskId(String),

    /// The pull request URL is empty after trimming.
    #[error("pull request URL must not be empty")]
    EmptyPullRequestUrl,
}

/// Error returned while parsing internal states from storage or logs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown internal task state: {0}")]
pub struct ParseInternalStateError(pub String);

/// Error returned while parsing public statuses from persisted records.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParsePublicStatusError(pub String);

/// Error returned while parsing review reasons from persisted records.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown review reason: {0}")]
pub struct ParseReviewReasonError(pub String);
