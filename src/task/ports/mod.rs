//! Port contracts for task lifecycle reconciliation.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod mirror;
pub mod observer;
pub mod status_store;

pub use mirror::MirrorLocator;
pub use observer::{StatusChange, StatusObserver};
pub use status_store::{StatusStore, StatusStoreError, StatusStoreResult};

#[cfg(test)]
pub use mirror::MockMirrorLocator;
#[cfg(test)]
pub use observer::MockStatusObserver;
