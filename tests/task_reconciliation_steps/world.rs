//! Shared world state for task reconciliation BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskwarden::task::{
    adapters::memory::{InMemoryStatusStore, NoMirror, RecordingObserver},
    domain::{ProjectId, RecordLocation, TaskContext, TaskId, Topology},
    services::TaskLifecycleController,
};

/// Controller type used by the BDD world.
pub type TestController = TaskLifecycleController<InMemoryStatusStore, NoMirror, DefaultClock>;

/// Scenario world for reconciliation behaviour tests.
pub struct ReconciliationWorld {
    pub controller: TestController,
    pub store: Arc<InMemoryStatusStore>,
    pub observer: RecordingObserver,
    pub project_id: ProjectId,
    pub task: Option<(TaskId, TaskContext)>,
}

impl ReconciliationWorld {
    /// Creates a world with no registered task.
    #[must_use]
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStatusStore::new());
        let observer = RecordingObserver::new();
        let mut controller = TaskLifecycleController::new(
            Topology::default(),
            Arc::clone(&store),
            Arc::new(NoMirror),
            Arc::new(DefaultClock),
        );
        controller.subscribe(Arc::new(observer.clone()));

        Self {
            controller,
            store,
            observer,
            project_id: ProjectId::new(),
            task: None,
        }
    }

    /// Registers a task with an existing record directory.
    pub fn register_task(&mut self, name: &str) -> Result<TaskContext, eyre::Report> {
        let task_id = TaskId::new(name)?;
        let dir = format!("/project/specs/{name}");
        self.store
            .add_location(RecordLocation::new(dir.as_str()))?;
        let context = TaskContext::new(self.project_id, "/project", dir);
        self.task = Some((task_id, context.clone()));
        Ok(context)
    }

    /// Returns the scenario's task.
    pub fn task(&self) -> Result<(TaskId, TaskContext), eyre::Report> {
        self.task
            .clone()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }
}

impl Default for ReconciliationWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> ReconciliationWorld {
    ReconciliationWorld::default()
}
