//! Path-resolution port for mirrored task records.

use crate::task::domain::{RecordLocation, TaskContext, TaskId};

/// Resolves the secondary record location for a task, such as the copy of
/// its record inside an isolated working tree.
#[cfg_attr(test, mockall::automock)]
pub trait MirrorLocator: Send + Sync {
    /// Returns the mirrored location for the task, or `None` when the task has
    /// no mirror. The location may not exist yet.
    fn mirror_location(&self, task_id: &TaskId, context: &TaskContext) -> Option<RecordLocation>;
}
