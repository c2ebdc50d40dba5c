//! Mirror locator for per-task isolated working trees.

use camino::Utf8PathBuf;

use crate::task::{
    domain::{RecordLocation, TaskContext, TaskId},
    ports::MirrorLocator,
};

/// Default directory, relative to the project root, holding task worktrees.
pub const DEFAULT_WORKTREES_DIR: &str = ".worktrees";

/// Resolves a task's mirrored record inside its worktree.
///
/// A record at `<root>/<rel>` is mirrored at
/// `<root>/<worktrees_dir>/<task_id>/<rel>`. Records outside the project root
/// have no mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorktreeMirrorLocator {
    worktrees_dir: Utf8PathBuf,
}

impl WorktreeMirrorLocator {
    /// Creates a locator using `worktrees_dir` relative to each project root.
    #[must_use]
    pub fn new(worktrees_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            worktrees_dir: worktrees_dir.into(),
        }
    }
}

impl Default for WorktreeMirrorLocator {
    fn default() -> Self {
        Self::new(DEFAULT_WORKTREES_DIR)
    }
}

impl MirrorLocator for WorktreeMirrorLocator {
    fn mirror_location(&self, task_id: &TaskId, context: &TaskContext) -> Option<RecordLocation> {
        let root = context.project_root();
        let relative = context
            .record_location()
            .as_path()
            .strip_prefix(root)
            .ok()?;
        let mirror = root
            .join(&self.worktrees_dir)
            .join(task_id.as_str())
            .join(relative);
        Some(RecordLocation::new(mirror))
    }
}
