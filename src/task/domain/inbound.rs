//! Envelopes for events entering the engine from any source.

use super::{AgentEvent, ManualEvent, PublicStatus, TaskContext, TaskId};
use serde::{Deserialize, Serialize};

/// One inbound event together with the task it targets.
///
/// Serialized tagged by `source`, one envelope per line in replay logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum InboundEvent {
    /// An event reported by the agent process.
    #[serde(rename_all = "camelCase")]
    Agent {
        /// Target task.
        task_id: TaskId,
        /// Agent event.
        event: AgentEvent,
        /// Task context.
        context: TaskContext,
    },
    /// A user action.
    #[serde(rename_all = "camelCase")]
    Manual {
        /// Target task.
        task_id: TaskId,
        /// Manual event.
        event: ManualEvent,
        /// Task context.
        context: TaskContext,
    },
    /// A request to set the coarse status directly.
    #[serde(rename_all = "camelCase")]
    StatusChange {
        /// Target task.
        task_id: TaskId,
        /// Requested public status.
        target: PublicStatus,
        /// Task context.
        context: TaskContext,
    },
    /// Process supervision reported the agent process exited.
    #[serde(rename_all = "camelCase")]
    ProcessExit {
        /// Target task.
        task_id: TaskId,
        /// Exit code, when the process exited normally.
        #[serde(default)]
        exit_code: Option<i32>,
        /// Task context, when the supervisor still has it.
        #[serde(default)]
        context: Option<TaskContext>,
    },
    /// The task was deleted or archived.
    #[serde(rename_all = "camelCase")]
    Remove {
        /// Target task.
        task_id: TaskId,
    },
}

impl InboundEvent {
    /// Returns the targeted task.
    #[must_use]
    pub const fn task_id(&self) -> &TaskId {
        match self {
            Self::Agent { task_id, .. }
            | Self::Manual { task_id, .. }
            | Self::StatusChange { task_id, .. }
            | Self::ProcessExit { task_id, .. }
            | Self::Remove { task_id } => task_id,
        }
    }
}
