//! Adapter implementations for task lifecycle ports.

pub mod fs;
pub mod logging;
pub mod memory;

pub use logging::LoggingObserver;
