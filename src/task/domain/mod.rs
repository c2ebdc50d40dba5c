//! Domain model for task lifecycle reconciliation.
//!
//! The domain holds the pure parts of the engine: the state topology, the
//! per-task machine, the projection between internal states and persisted
//! public statuses, and the event vocabulary. Nothing here performs I/O.

mod context;
mod error;
mod event;
mod ids;
mod inbound;
mod projection;
mod pull_request;
mod state;
mod topology;

pub use context::{RecordLocation, TaskContext};
pub use error::{
    ParseInternalStateError, ParsePublicStatusError, ParseReviewReasonError, TaskDomainError,
};
pub use event::{
    AgentEvent, AgentEventKind, DEFAULT_EVENT_LINE_PREFIX, EventParseError, ManualEvent,
    TaskEvent, parse_event_line,
};
pub use ids::{ProjectId, TaskId};
pub use inbound::InboundEvent;
pub use projection::{project, project_snapshot, rehydrate, rehydrate_snapshot};
pub use pull_request::PullRequestUrl;
pub use state::{
    InternalState, PublicStatus, ReviewReason, StatusRecord, TaskError, TaskErrorKind,
    TaskSnapshot,
};
pub use topology::{QaPassTarget, TaskMachine, Topology, Transition, manual_event_for_status};
