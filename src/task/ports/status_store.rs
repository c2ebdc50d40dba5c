//! Store port for persisted task status records.

use crate::task::domain::{RecordLocation, StatusRecord};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for status store operations.
pub type StatusStoreResult<T> = Result<T, StatusStoreError>;

/// Persisted status record contract.
///
/// Writes are synchronous and performed inline while an event is handled.
pub trait StatusStore: Send + Sync {
    /// Writes `record` to the task record held at `location`.
    ///
    /// # Errors
    ///
    /// Returns [`StatusStoreError::LocationMissing`] when the location does
    /// not exist, [`StatusStoreError::MalformedRecord`] when an existing
    /// record cannot be merged, or [`StatusStoreError::Io`] for other storage
    /// failures.
    fn write_status(
        &self,
        location: &RecordLocation,
        record: StatusRecord,
        updated_at: DateTime<Utc>,
    ) -> StatusStoreResult<()>;

    /// Returns whether `location` currently exists.
    ///
    /// # Errors
    ///
    /// Returns [`StatusStoreError::Io`] when existence cannot be determined.
    fn location_exists(&self, location: &RecordLocation) -> StatusStoreResult<bool>;
}

/// Errors returned by status store implementations.
#[derive(Debug, Clone, Error)]
pub enum StatusStoreError {
    /// The record location does not exist.
    #[error("record location does not exist: {0}")]
    LocationMissing(RecordLocation),

    /// The existing record is not a JSON object.
    #[error("malformed task record at {location}: {reason}")]
    MalformedRecord {
        /// Record location.
        location: RecordLocation,
        /// Reason the record could not be merged.
        reason: String,
    },

    /// Storage-layer failure.
    #[error("status store I/O error: {0}")]
    Io(Arc<dyn std::error::Error + Send + Sync>),
}

impl StatusStoreError {
    /// Wraps a storage-layer error.
    pub fn io(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Io(Arc::new(err))
    }
}
