//! In-memory status store for reconciliation tests.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{RecordLocation, StatusRecord},
    ports::{StatusStore, StatusStoreError, StatusStoreResult},
};

/// One write accepted by [`InMemoryStatusStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedWrite {
    /// Location written.
    pub location: RecordLocation,
    /// Record written.
    pub record: StatusRecord,
    /// Timestamp supplied with the write.
    pub updated_at: DateTime<Utc>,
}

/// Thread-safe in-memory status store.
///
/// Locations must be registered with [`InMemoryStatusStore::add_location`]
/// before they can be written, mirroring a filesystem where the record
/// directory has to exist.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStatusStore {
    state: Arc<RwLock<InMemoryStatusState>>,
}

#[derive(Debug, Default)]
struct InMemoryStatusState {
    locations: HashSet<RecordLocation>,
    failing: HashSet<RecordLocation>,
    records: HashMap<RecordLocation, StatusRecord>,
    writes: Vec<RecordedWrite>,
}

fn poisoned(err: impl std::fmt::Display) -> StatusStoreError {
    StatusStoreError::io(std::io::Error::other(err.to_string()))
}

impl InMemoryStatusStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `location` as existing.
    ///
    /// # Errors
    ///
    /// Returns [`StatusStoreError::Io`] when the store lock is poisoned.
    pub fn add_location(&self, location: RecordLocation) -> StatusStoreResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.locations.insert(location);
        Ok(())
    }

    /// Makes every later write to `location` fail with an I/O error.
    ///
    /// # Errors
    ///
    /// Returns [`StatusStoreError::Io`] when the store lock is poisoned.
    pub fn fail_writes_to(&self, location: RecordLocation) -> StatusStoreResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state.failing.insert(location);
        Ok(())
    }

    /// Returns the latest record written to `location`.
    #[must_use]
    pub fn record_at(&self, location: &RecordLocation) -> Option<StatusRecord> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.records.get(location).copied())
    }

    /// Returns every successful write in order.
    #[must_use]
    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.state
            .read()
            .map(|state| state.writes.clone())
            .unwrap_or_default()
    }

    /// Returns the number of successful writes to `location`.
    #[must_use]
    pub fn write_count(&self, location: &RecordLocation) -> usize {
        self.writes()
            .iter()
            .filter(|write| write.location == *location)
            .count()
    }
}

impl StatusStore for InMemoryStatusStore {
    fn write_status(
        &self,
        location: &RecordLocation,
        record: StatusRecord,
        updated_at: DateTime<Utc>,
    ) -> StatusStoreResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        if !state.locations.contains(location) {
            return Err(StatusStoreError::LocationMissing(location.clone()));
        }
        if state.failing.contains(location) {
            return Err(StatusStoreError::io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("write to {location} rejected"),
            )));
        }

        state.records.insert(location.clone(), record);
        state.writes.push(RecordedWrite {
            location: location.clone(),
            record,
            updated_at,
        });
        Ok(())
    }

    fn location_exists(&self, location: &RecordLocation) -> StatusStoreResult<bool> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.locations.contains(location))
    }
}
