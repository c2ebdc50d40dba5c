//! Observer that reports status changes through `tracing`.

use tracing::info;

use crate::task::ports::{StatusChange, StatusObserver};

/// Logs every public status change at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl StatusObserver for LoggingObserver {
    fn status_changed(&self, change: &StatusChange) {
        info!(
            task_id = %change.task_id,
            project_id = %change.project_id,
            status = %change.status,
            review_reason = change.review_reason.map(|reason| reason.as_str()),
            "task status changed"
        );
    }
}
