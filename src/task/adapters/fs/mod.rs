//! Filesystem adapters backed by capability-based directory handles.

mod mirror;
mod status_store;

pub use mirror::{DEFAULT_WORKTREES_DIR, WorktreeMirrorLocator};
pub use status_store::{DEFAULT_RECORD_FILE_NAME, FsStatusStore};
#[cfg(test)]
pub(crate) use status_store::replace_record;
