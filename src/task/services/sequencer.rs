//! Per-task sequence gate and terminal-event memory.

use std::collections::{HashMap, HashSet};

use crate::task::domain::TaskId;

/// Rejects stale or duplicate agent events and remembers which tasks have
/// reached a terminal agent event.
#[derive(Debug, Clone, Default)]
pub struct EventSequencer {
    high_water: HashMap<TaskId, u64>,
    terminal: HashSet<TaskId>,
}

impl EventSequencer {
    /// Creates an empty sequencer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts an event for `task_id`.
    ///
    /// Unsequenced events are always accepted. A sequenced event is accepted,
    /// and its number recorded as the new high-water mark, only when it is
    /// strictly greater than the current mark.
    pub fn accept(&mut self, task_id: &TaskId, sequence: Option<u64>) -> bool {
        let Some(sequence) = sequence else {
            return true;
        };
        match self.high_water.get_mut(task_id) {
            Some(mark) if sequence <= *mark => false,
            Some(mark) => {
                *mark = sequence;
                true
            }
            None => {
                self.high_water.insert(task_id.clone(), sequence);
                true
            }
        }
    }

    /// Returns the highest accepted sequence for `task_id`.
    #[must_use]
    pub fn last_sequence(&self, task_id: &TaskId) -> Option<u64> {
        self.high_water.get(task_id).copied()
    }

    /// Records that `task_id` reached a terminal agent event.
    pub fn mark_terminal(&mut self, task_id: &TaskId) {
        self.terminal.insert(task_id.clone());
    }

    /// Returns whether `task_id` reached a terminal agent event.
    #[must_use]
    pub fn is_terminal(&self, task_id: &TaskId) -> bool {
        self.terminal.contains(task_id)
    }

    /// Drops the sequence mark and terminal flag for `task_id`.
    pub fn clear(&mut self, task_id: &TaskId) {
        self.high_water.remove(task_id);
        self.terminal.remove(task_id);
    }
}
