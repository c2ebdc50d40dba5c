//! Task lifecycle reconciliation.
//!
//! This module turns a stream of agent events, user actions, and process
//! exits into a consistent persisted status per task. Each task gets its own
//! state machine; accepted events drive transitions, transitions are
//! projected onto a coarse public status, and public status changes are
//! written to the task's records and announced to observers. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
