//! Observer that records every notification it receives.

use std::sync::{Arc, Mutex};

use crate::task::{
    domain::TaskId,
    ports::{StatusChange, StatusObserver},
};

/// Thread-safe observer capturing notifications for later inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    changes: Arc<Mutex<Vec<StatusChange>>>,
}

impl RecordingObserver {
    /// Creates an observer with no recorded changes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every notification received so far.
    #[must_use]
    pub fn changes(&self) -> Vec<StatusChange> {
        self.changes
            .lock()
            .map(|changes| changes.clone())
            .unwrap_or_default()
    }

    /// Returns the notifications received for `task_id`.
    #[must_use]
    pub fn changes_for(&self, task_id: &TaskId) -> Vec<StatusChange> {
        self.changes()
            .into_iter()
            .filter(|change| change.task_id == *task_id)
            .collect()
    }
}

impl StatusObserver for RecordingObserver {
    fn status_changed(&self, change: &StatusChange) {
        if let Ok(mut changes) = self.changes.lock() {
            changes.push(change.clone());
        }
    }
}
