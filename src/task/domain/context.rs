//! Caller-supplied context locating a task's persisted records.

use super::{ProjectId, StatusRecord};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Directory holding a persisted task status record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordLocation(Utf8PathBuf);

impl RecordLocation {
    /// Creates a record location for `dir`.
    #[must_use]
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self(dir.into())
    }

    /// Returns the directory path.
    #[must_use]
    pub fn as_path(&self) -> &Utf8Path {
        &self.0
    }
}

impl fmt::Display for RecordLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The `(task, project)` pair an inbound event is scoped to.
///
/// The controller caches the most recent context per task so that process
/// exits reported without context can still be reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskContext {
    project_id: ProjectId,
    project_root: Utf8PathBuf,
    record_location: RecordLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    persisted: Option<StatusRecord>,
}

impl TaskContext {
    /// Creates a context for a task whose primary record lives in
    /// `record_dir` inside `project_root`.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        project_root: impl Into<Utf8PathBuf>,
        record_dir: impl Into<Utf8PathBuf>,
    ) -> Self {
        Self {
            project_id,
            project_root: project_root.into(),
            record_location: RecordLocation::new(record_dir),
            persisted: None,
        }
    }

    /// Attaches the status last persisted for the task.
    #[must_use]
    pub const fn with_persisted(mut self, record: StatusRecord) -> Self {
        self.persisted = Some(record);
        self
    }

    /// Returns the owning project identifier.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the project root directory.
    #[must_use]
    pub fn project_root(&self) -> &Utf8Path {
        &self.project_root
    }

    /// Returns the primary record location.
    #[must_use]
    pub const fn record_location(&self) -> &RecordLocation {
        &self.record_location
    }

    /// Returns the status last persisted for the task, if known.
    #[must_use]
    pub const fn persisted(&self) -> Option<StatusRecord> {
        self.persisted
    }
}
