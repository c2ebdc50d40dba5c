//! In-memory adapters for tests and embedders without a filesystem.

mod mirror;
mod observer;
mod status_store;

pub use mirror::{NoMirror, StaticMirrorLocator};
pub use observer::RecordingObserver;
pub use status_store::{InMemoryStatusStore, RecordedWrite};
