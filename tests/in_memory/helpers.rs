//! Shared helpers for in-memory reconciliation tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskwarden::task::{
    adapters::memory::{InMemoryStatusStore, RecordingObserver, StaticMirrorLocator},
    domain::{
        AgentEvent, AgentEventKind, ProjectId, RecordLocation, TaskContext, TaskId, Topology,
    },
    services::TaskLifecycleController,
};

/// Project root shared by every test task.
pub const PROJECT_ROOT: &str = "/repo";

/// Controller type used by in-memory tests.
pub type TestController =
    TaskLifecycleController<InMemoryStatusStore, StaticMirrorLocator, DefaultClock>;

/// A controller wired to inspectable in-memory adapters.
pub struct Reconciler {
    /// Controller under test.
    pub controller: TestController,
    /// Backing status store.
    pub store: Arc<InMemoryStatusStore>,
    /// Observer subscribed to the controller.
    pub observer: RecordingObserver,
}

/// A task registered with a [`Reconciler`].
pub struct TestTask {
    /// Task identifier.
    pub id: TaskId,
    /// Context supplied with each event.
    pub context: TaskContext,
    /// Mirrored record location inside the task worktree.
    pub mirror: RecordLocation,
}

impl Reconciler {
    /// Builds a reconciler whose tasks all have mirrors under `.worktrees`.
    ///
    /// Mirror locations are not registered with the store, so mirror writes
    /// are skipped until a test adds them.
    pub fn new(task_names: &[&str]) -> (Self, Vec<TestTask>) {
        let store = Arc::new(InMemoryStatusStore::new());
        let project_id = ProjectId::new();
        let mut mirrors = StaticMirrorLocator::new();
        let mut tasks = Vec::with_capacity(task_names.len());

        for name in task_names {
            let id = TaskId::new(*name).expect("valid task id");
            let primary = format!("{PROJECT_ROOT}/specs/{name}");
            let mirror = RecordLocation::new(format!(
                "{PROJECT_ROOT}/.worktrees/{name}/specs/{name}"
            ));
            store
                .add_location(RecordLocation::new(primary.as_str()))
                .expect("register record location");
            mirrors = mirrors.with_mirror(id.clone(), mirror.clone());
            tasks.push(TestTask {
                id,
                context: TaskContext::new(project_id, PROJECT_ROOT, primary),
                mirror,
            });
        }

        let observer = RecordingObserver::new();
        let mut controller = TaskLifecycleController::new(
            Topology::default(),
            Arc::clone(&store),
            Arc::new(mirrors),
            Arc::new(DefaultClock),
        );
        controller.subscribe(Arc::new(observer.clone()));

        (
            Self {
                controller,
                store,
                observer,
            },
            tasks,
        )
    }
}

/// Provides a reconciler with a single task named `001-feature`.
#[fixture]
pub fn single() -> (Reconciler, TestTask) {
    let (reconciler, mut tasks) = Reconciler::new(&["001-feature"]);
    let task = tasks.pop().expect("one task");
    (reconciler, task)
}

/// Builds a sequenced agent event.
pub const fn seq(sequence: u64, kind: AgentEventKind) -> AgentEvent {
    AgentEvent::sequenced(sequence, kind)
}
