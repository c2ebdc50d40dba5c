//! Fixed mirror locators.

use std::collections::HashMap;

use crate::task::{
    domain::{RecordLocation, TaskContext, TaskId},
    ports::MirrorLocator,
};

/// Locator for deployments without mirrored records.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMirror;

impl MirrorLocator for NoMirror {
    fn mirror_location(&self, _task_id: &TaskId, _context: &TaskContext) -> Option<RecordLocation> {
        None
    }
}

/// Locator returning preconfigured mirror locations per task.
#[derive(Debug, Clone, Default)]
pub struct StaticMirrorLocator {
    locations: HashMap<TaskId, RecordLocation>,
}

impl StaticMirrorLocator {
    /// Creates a locator with no mirrors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the mirror location for `task_id`.
    #[must_use]
    pub fn with_mirror(mut self, task_id: TaskId, location: RecordLocation) -> Self {
        self.locations.insert(task_id, location);
        self
    }
}

impl MirrorLocator for StaticMirrorLocator {
    fn mirror_location(&self, task_id: &TaskId, _context: &TaskContext) -> Option<RecordLocation> {
        self.locations.get(task_id).cloned()
    }
}
