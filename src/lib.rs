//! Taskwarden: lifecycle reconciliation for agent-driven coding tasks.
//!
//! Long-running coding tasks are executed by out-of-process agents that
//! report progress as a stream of lifecycle events. This crate reconciles
//! those events, together with manual overrides and process exits, into a
//! consistent persisted status for every task.
//!
//! # Architecture
//!
//! Taskwarden follows hexagonal architecture principles:
//!
//! - **Domain**: Pure state topology, projection, and event vocabulary
//! - **Ports**: Abstract trait interfaces for persistence and notification
//! - **Adapters**: Concrete implementations of ports (filesystem, in-memory)
//!
//! # Modules
//!
//! - [`task`]: Task state machines, event sequencing, and status fan-out
//! - [`config`]: Reconciler configuration loading

pub mod config;
pub mod task;
