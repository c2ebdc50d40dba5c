//! Application services for task lifecycle reconciliation.

mod controller;
mod dispatcher;
mod fanout;
mod sequencer;

pub use controller::TaskLifecycleController;
pub use dispatcher::{DispatchError, Dispatcher, DispatcherHandle};
pub use fanout::{FanoutReport, StatusFanout, WriteOutcome};
pub use sequencer::EventSequencer;
