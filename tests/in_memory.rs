//! In-memory reconciliation integration tests.
//!
//! Tests are organized into modules by functionality:
//! - `controller_flow_tests`: Full task lifecycles through the controller
//! - `dispatcher_tests`: Concurrent submission through the dispatcher

mod in_memory {
    pub mod helpers;

    mod controller_flow_tests;
    mod dispatcher_tests;
}
