//! Replays a log of inbound task events against project directories.
//!
//! Usage:
//!
//! ```text
//! taskwarden_replay <events-path> [config-path]
//! ```
//!
//! Each non-empty line of `events-path` must be one JSON inbound envelope,
//! for example:
//!
//! ```json
//! {"source":"agent","taskId":"001-login","event":{"type":"PLAN_READY","sequence":1},
//!  "context":{"projectId":"6f1c...","projectRoot":"/work/app",
//!             "recordLocation":"/work/app/specs/001-login"}}
//! ```
//!
//! When an envelope's context carries no persisted status, the status already
//! stored at its record location is used to rehydrate the task. Logging is
//! controlled through `RUST_LOG` and defaults to `info`.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use mockable::DefaultClock;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use taskwarden::config::{ReconcilerConfig, ReconcilerConfigError};
use taskwarden::task::{
    adapters::{
        LoggingObserver,
        fs::{FsStatusStore, WorktreeMirrorLocator},
    },
    domain::{InboundEvent, TaskContext},
    services::TaskLifecycleController,
};
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum ReplayError {
    #[error("usage: taskwarden_replay <events-path> [config-path]")]
    Usage,
    #[error(transparent)]
    Config(#[from] ReconcilerConfigError),
    #[error("failed to read event log {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Default)]
struct ReplaySummary {
    applied: usize,
    ignored: usize,
    malformed: usize,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(env::args().skip(1).collect()) {
        Ok(summary) => {
            info!(
                applied = summary.applied,
                ignored = summary.ignored,
                malformed = summary.malformed,
                "replay finished"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "replay failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<ReplaySummary, ReplayError> {
    let mut remaining = args.into_iter();
    let events_path = remaining
        .next()
        .map(Utf8PathBuf::from)
        .ok_or(ReplayError::Usage)?;
    let config_path = remaining.next().map(Utf8PathBuf::from);
    if remaining.next().is_some() {
        return Err(ReplayError::Usage);
    }

    let config = ReconcilerConfig::load(config_path.as_deref())?;
    let store = Arc::new(config.status_store());
    let mut controller = TaskLifecycleController::new(
        config.topology(),
        Arc::clone(&store),
        Arc::new(config.mirror_locator()),
        Arc::new(DefaultClock),
    );
    controller.subscribe(Arc::new(LoggingObserver));

    let contents = read_log(&events_path)?;
    let mut summary = ReplaySummary::default();
    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<InboundEvent>(line) {
            Ok(envelope) => {
                if controller.apply(with_stored_status(&store, envelope)) {
                    summary.applied += 1;
                } else {
                    summary.ignored += 1;
                }
            }
            Err(err) => {
                warn!(line = index + 1, error = %err, "skipping malformed envelope");
                summary.malformed += 1;
            }
        }
    }
    Ok(summary)
}

fn read_log(path: &Utf8Path) -> Result<String, ReplayError> {
    let read_error = |source| ReplayError::Read {
        path: path.to_owned(),
        source,
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| read_error(std::io::Error::other("path must include a file name")))?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
    dir.read_to_string(file_name).map_err(read_error)
}

fn with_stored_status(store: &FsStatusStore, event: InboundEvent) -> InboundEvent {
    match event {
        InboundEvent::Agent {
            task_id,
            event,
            context,
        } => InboundEvent::Agent {
            task_id,
            event,
            context: fill_persisted(store, context),
        },
        InboundEvent::Manual {
            task_id,
            event,
            context,
        } => InboundEvent::Manual {
            task_id,
            event,
            context: fill_persisted(store, context),
        },
        InboundEvent::StatusChange {
            task_id,
            target,
            context,
        } => InboundEvent::StatusChange {
            task_id,
            target,
            context: fill_persisted(store, context),
        },
        InboundEvent::ProcessExit {
            task_id,
            exit_code,
            context,
        } => InboundEvent::ProcessExit {
            task_id,
            exit_code,
            context: context.map(|context| fill_persisted(store, context)),
        },
        InboundEvent::Remove { task_id } => InboundEvent::Remove { task_id },
    }
}

fn fill_persisted(store: &FsStatusStore, context: TaskContext) -> TaskContext {
    if context.persisted().is_some() {
        return context;
    }
    match store.read_status(context.record_location()) {
        Ok(Some(record)) => context.with_persisted(record),
        Ok(None) => context,
        Err(err) => {
            warn!(
                location = %context.record_location(),
                error = %err,
                "ignoring unreadable task record"
            );
            context
        }
    }
}
