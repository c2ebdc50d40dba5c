//! Persistence and notification fan-out for public status changes.

use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::task::{
    domain::{RecordLocation, StatusRecord, TaskContext, TaskId},
    ports::{MirrorLocator, StatusChange, StatusObserver, StatusStore, StatusStoreError},
};

/// Outcome of one record write.
#[derive(Debug, Clone)]
pub enum WriteOutcome {
    /// The record was written.
    Written(RecordLocation),
    /// No write was attempted because the location is absent.
    Skipped,
    /// The write failed; the failure was logged.
    Failed(StatusStoreError),
}

impl WriteOutcome {
    /// Returns whether the record was written.
    #[must_use]
    pub const fn is_written(&self) -> bool {
        matches!(self, Self::Written(_))
    }
}

/// Result of publishing one status change.
#[derive(Debug, Clone)]
pub struct FanoutReport {
    /// Primary record write.
    pub primary: WriteOutcome,
    /// Mirrored record write.
    pub mirror: WriteOutcome,
    /// Number of observers notified.
    pub notified: usize,
}

/// Writes projected statuses to every applicable record and notifies
/// observers.
///
/// The primary write, the mirror write, and the notification are independent:
/// a failure in one never prevents or rolls back the others.
pub struct StatusFanout<S, M, C>
where
    S: StatusStore,
    M: MirrorLocator,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    mirrors: Arc<M>,
    clock: Arc<C>,
    observers: Vec<Arc<dyn StatusObserver>>,
}

impl<S, M, C> StatusFanout<S, M, C>
where
    S: StatusStore,
    M: MirrorLocator,
    C: Clock + Send + Sync,
{
    /// Creates a fan-out with no observers.
    #[must_use]
    pub const fn new(store: Arc<S>, mirrors: Arc<M>, clock: Arc<C>) -> Self {
        Self {
            store,
            mirrors,
            clock,
            observers: Vec::new(),
        }
    }

    /// Registers an observer for every later status change.
    pub fn subscribe(&mut self, observer: Arc<dyn StatusObserver>) {
        self.observers.push(observer);
    }

    /// Returns the number of registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Persists `record` for `task_id` and notifies observers.
    pub fn publish(
        &self,
        task_id: &TaskId,
        context: &TaskContext,
        record: StatusRecord,
    ) -> FanoutReport {
        let changed_at = self.clock.utc();

        let primary = match self
            .store
            .write_status(context.record_location(), record, changed_at)
        {
            Ok(()) => WriteOutcome::Written(context.record_location().clone()),
            Err(err) => {
                warn!(%task_id, error = %err, "failed to write primary task record");
                WriteOutcome::Failed(err)
            }
        };

        let mirror = self.write_mirror(task_id, context, record, changed_at);

        let change = StatusChange {
            task_id: task_id.clone(),
            project_id: context.project_id(),
            status: record.status,
            review_reason: record.review_reason,
            changed_at,
        };
        for observer in &self.observers {
            observer.status_changed(&change);
        }

        FanoutReport {
            primary,
            mirror,
            notified: self.observers.len(),
        }
    }

    fn write_mirror(
        &self,
        task_id: &TaskId,
        context: &TaskContext,
        record: StatusRecord,
        changed_at: DateTime<Utc>,
    ) -> WriteOutcome {
        let Some(location) = self.mirrors.mirror_location(task_id, context) else {
            return WriteOutcome::Skipped;
        };
        match self.store.location_exists(&location) {
            Ok(true) => {}
            Ok(false) => {
                debug!(%task_id, %location, "mirror location absent, skipping");
                return WriteOutcome::Skipped;
            }
            Err(err) => {
                warn!(%task_id, %location, error = %err, "failed to probe mirror location");
                return WriteOutcome::Failed(err);
            }
        }
        match self.store.write_status(&location, record, changed_at) {
            Ok(()) => WriteOutcome::Written(location),
            Err(err) => {
                warn!(%task_id, %location, error = %err, "failed to write mirrored task record");
                WriteOutcome::Failed(err)
            }
        }
    }
}
