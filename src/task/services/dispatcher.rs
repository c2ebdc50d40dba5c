//! Asynchronous front end serializing inbound events into one controller.
//!
//! Event sources (agent output readers, UI handlers, process supervisors) run
//! concurrently and submit [`InboundEvent`]s through a cloneable
//! [`DispatcherHandle`]. A single consumer task owns the controller and applies
//! events in submission order, so each task's events are handled in the order
//! they were accepted.

use mockable::Clock;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::TaskLifecycleController;
use crate::task::{
    domain::InboundEvent,
    ports::{MirrorLocator, StatusStore},
};

/// Errors returned by the dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The consumer task has already shut down.
    #[error("dispatcher is closed")]
    Closed,
    /// The consumer task panicked or was cancelled.
    #[error("dispatcher worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Cloneable handle used by event sources to submit inbound events.
#[derive(Debug, Clone)]
pub struct DispatcherHandle {
    sender: mpsc::UnboundedSender<InboundEvent>,
}

impl DispatcherHandle {
    /// Queues an inbound event for the controller.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Closed`] when the dispatcher has shut down.
    pub fn submit(&self, event: InboundEvent) -> Result<(), DispatchError> {
        self.sender.send(event).map_err(|_| DispatchError::Closed)
    }
}

/// Owner of the consumer task driving a [`TaskLifecycleController`].
pub struct Dispatcher<S, M, C>
where
    S: StatusStore + 'static,
    M: MirrorLocator + 'static,
    C: Clock + Send + Sync + 'static,
{
    handle: DispatcherHandle,
    worker: JoinHandle<TaskLifecycleController<S, M, C>>,
}

impl<S, M, C> Dispatcher<S, M, C>
where
    S: StatusStore + 'static,
    M: MirrorLocator + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Moves `controller` onto a consumer task on the current runtime.
    #[must_use]
    pub fn spawn(mut controller: TaskLifecycleController<S, M, C>) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<InboundEvent>();
        let worker = tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                let task_id = event.task_id().clone();
                let applied = controller.apply(event);
                debug!(%task_id, applied, "dispatched inbound event");
            }
            controller
        });
        Self {
            handle: DispatcherHandle { sender },
            worker,
        }
    }

    /// Returns a handle for submitting events.
    #[must_use]
    pub fn handle(&self) -> DispatcherHandle {
        self.handle.clone()
    }

    /// Stops accepting events from this dispatcher's own handle, drains the
    /// queue once every cloned handle is dropped, and returns the controller.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Worker`] when the consumer task failed.
    pub async fn shutdown(self) -> Result<TaskLifecycleController<S, M, C>, DispatchError> {
        drop(self.handle);
        Ok(self.worker.await?)
    }
}
