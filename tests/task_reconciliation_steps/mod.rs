//! Step definitions for task reconciliation scenarios.

pub mod world;

mod given;
mod then;
mod when;
