//! Observer port for public status change notifications.

use crate::task::domain::{ProjectId, PublicStatus, ReviewReason, StatusRecord, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Notification emitted once per actual public status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    /// Task whose status changed.
    pub task_id: TaskId,
    /// Project owning the task.
    pub project_id: ProjectId,
    /// New public status.
    pub status: PublicStatus,
    /// Review qualifier for the new status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_reason: Option<ReviewReason>,
    /// When the change was published.
    pub changed_at: DateTime<Utc>,
}

impl StatusChange {
    /// Returns the `(status, reviewReason)` pair carried by the notification.
    #[must_use]
    pub const fn record(&self) -> StatusRecord {
        StatusRecord {
            status: self.status,
            review_reason: self.review_reason,
        }
    }
}

/// Receives public status change notifications.
#[cfg_attr(test, mockall::automock)]
pub trait StatusObserver: Send + Sync {
    /// Called after a task's public status changed.
    fn status_changed(&self, change: &StatusChange);
}
