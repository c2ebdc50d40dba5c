//! Reconciler configuration.
//!
//! Settings are read from an optional TOML file and overridden by
//! `TASKWARDEN_*` environment variables, for example
//! `TASKWARDEN_QA_PASS_TARGET=done`. Missing keys fall back to defaults.

use camino::{Utf8Path, Utf8PathBuf};
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::task::{
    adapters::fs::{
        DEFAULT_RECORD_FILE_NAME, DEFAULT_WORKTREES_DIR, FsStatusStore, WorktreeMirrorLocator,
    },
    domain::{
        AgentEvent, DEFAULT_EVENT_LINE_PREFIX, EventParseError, QaPassTarget, Topology,
        parse_event_line,
    },
};

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "TASKWARDEN";

/// Errors returned while loading configuration.
#[derive(Debug, Error)]
pub enum ReconcilerConfigError {
    /// A source could not be read or deserialized.
    #[error("failed to load reconciler configuration: {0}")]
    Load(#[from] ::config::ConfigError),
}

/// Settings controlling how tasks are reconciled and persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerConfig {
    /// File name of the task record inside each record location.
    pub record_file_name: String,
    /// Directory, relative to the project root, holding per-task worktrees.
    pub worktrees_dir: Utf8PathBuf,
    /// Where tasks go once QA approves their work.
    pub qa_pass_target: QaPassTarget,
    /// Marker prefixing event lines in agent output.
    pub event_line_prefix: String,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            record_file_name: DEFAULT_RECORD_FILE_NAME.to_owned(),
            worktrees_dir: Utf8PathBuf::from(DEFAULT_WORKTREES_DIR),
            qa_pass_target: QaPassTarget::default(),
            event_line_prefix: DEFAULT_EVENT_LINE_PREFIX.to_owned(),
        }
    }
}

impl ReconcilerConfig {
    /// Loads configuration from `path`, when given, layered under
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcilerConfigError::Load`] when the file is missing or
    /// malformed, or a value has the wrong type.
    pub fn load(path: Option<&Utf8Path>) -> Result<Self, ReconcilerConfigError> {
        let mut builder = Config::builder();
        if let Some(file_path) = path {
            builder = builder.add_source(File::from(file_path.as_std_path()).required(true));
        }
        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Returns the transition topology.
    #[must_use]
    pub const fn topology(&self) -> Topology {
        Topology::new(self.qa_pass_target)
    }

    /// Returns a filesystem status store using the configured record name.
    #[must_use]
    pub fn status_store(&self) -> FsStatusStore {
        FsStatusStore::new(self.record_file_name.clone())
    }

    /// Returns a worktree mirror locator using the configured directory.
    #[must_use]
    pub fn mirror_locator(&self) -> WorktreeMirrorLocator {
        WorktreeMirrorLocator::new(self.worktrees_dir.clone())
    }

    /// Decodes one line of agent output using the configured marker.
    ///
    /// # Errors
    ///
    /// Returns [`EventParseError::Payload`] when a marker line carries an
    /// invalid event.
    pub fn parse_agent_line(&self, line: &str) -> Result<Option<AgentEvent>, EventParseError> {
        parse_event_line(line, &self.event_line_prefix)
    }
}
