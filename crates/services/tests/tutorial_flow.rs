use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use services::{
    AppServices, CompletionClient, CompletionError, ModuleStatus, ProgressTracker, TutorialRunner,
};
use storage::repository::{
    InMemoryRepository, ModuleActivityRepository, StageProgressRepository, StageRecord, Storage,
    StorageError,
};
use tutor_core::model::{ModuleId, SamplingSettings, StagePosition};
use tutor_core::time::fixed_clock;
use tutor_core::visualization::{RunState, TryItPanel};
use tutor_core::{Effect, TutorialSettings};

struct RejectingClient;

#[async_trait]
impl CompletionClient for RejectingClient {
    async fn complete(
        &self,
        _request: &tutor_core::model::CompletionRequest,
    ) -> Result<String, CompletionError> {
        Err(CompletionError::Api("rate limited".into()))
    }
}

#[derive(Default)]
struct CountingTracker {
    started: Mutex<u32>,
    completed: Mutex<u32>,
}

#[async_trait]
impl ProgressTracker for CountingTracker {
    async fn mark_module_started(&self, _module_id: &ModuleId) {
        *self.started.lock().unwrap() += 1;
    }

    async fn mark_module_complete(&self, _module_id: &ModuleId) {
        *self.completed.lock().unwrap() += 1;
    }
}

fn services() -> (AppServices, Storage) {
    let storage = Storage::in_memory();
    let services = AppServices::with_storage(
        &storage,
        fixed_clock(),
        TutorialSettings::instant(),
        Arc::new(RejectingClient),
    )
    .expect("services");
    (services, storage)
}

#[tokio::test]
async fn failed_run_shows_message_and_reenables() {
    let (services, _) = services();
    let try_it = services.try_it();
    let mut panel = TryItPanel::new(None, "Hello", SamplingSettings::default());

    let request = panel.begin_run().expect("run starts");
    assert!(!panel.can_run());
    let outcome = try_it.run(&request).await;
    panel.finish(outcome);

    assert_eq!(panel.state(), &RunState::Failed("rate limited".into()));
    assert!(panel.can_run());
}

#[tokio::test]
async fn full_walkthrough_persists_and_tracks_once() {
    let (services, storage) = services();
    let module = services.module(&ModuleId::new("ollama").unwrap()).unwrap();
    let id = module.id().clone();
    let tracker = Arc::new(CountingTracker::default());
    let runner = TutorialRunner::new(fixed_clock(), Arc::clone(&storage.stages), tracker.clone());

    let mut controller = runner
        .open(Arc::clone(&module), services.settings())
        .await
        .unwrap();
    runner.apply(&id, controller.start()).await;
    for _ in 1..module.stage_count() {
        runner.apply(&id, controller.next()).await;
    }
    runner.apply(&id, controller.back()).await;
    runner.apply(&id, controller.go_to(module.stage_count() - 1)).await;

    let pending = runner.apply(&id, controller.next()).await;
    let Some(Effect::ScheduleFade { token, .. }) = pending.first().cloned() else {
        panic!("expected a fade, got {pending:?}");
    };
    let rest = runner.apply(&id, controller.finish_fade(token)).await;

    assert_eq!(rest, vec![Effect::ScrollToTop]);
    assert_eq!(controller.position(), StagePosition::Finished);
    assert_eq!(*tracker.started.lock().unwrap(), 1);
    assert_eq!(*tracker.completed.lock().unwrap(), 1);

    let overview = services.progress().overview(services.modules()).await.unwrap();
    let status = overview.iter().find(|o| o.id == id).unwrap().status;
    assert_eq!(status, ModuleStatus::Completed);

    let reopened = runner.open(module, services.settings()).await.unwrap();
    assert_eq!(reopened.position(), StagePosition::Finished);
}

#[tokio::test]
async fn recording_tracker_writes_activity() {
    let repo = InMemoryRepository::new();
    let storage = Storage {
        stages: Arc::new(repo.clone()),
        activity: Arc::new(repo.clone()),
    };
    let services = AppServices::with_storage(
        &storage,
        fixed_clock(),
        TutorialSettings::instant(),
        Arc::new(RejectingClient),
    )
    .unwrap();
    let module = services.module(&ModuleId::new("agentic-ai").unwrap()).unwrap();
    let runner = services.runner();

    let mut controller = runner
        .open(Arc::clone(&module), services.settings())
        .await
        .unwrap();
    runner.apply(module.id(), controller.start()).await;

    let activity = repo.get_activity(module.id()).await.unwrap().unwrap();
    assert_eq!(activity.start_count, 1);
    assert!(!activity.is_completed());
}

/// Stage store whose write of one particular value stalls.
struct SlowStages {
    inner: InMemoryRepository,
    slow_stage: i64,
}

#[async_trait]
impl StageProgressRepository for SlowStages {
    async fn load_stage(&self, module_id: &ModuleId) -> Result<Option<i64>, StorageError> {
        self.inner.load_stage(module_id).await
    }

    async fn save_stage(
        &self,
        module_id: &ModuleId,
        stage: i64,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        if stage == self.slow_stage {
            tokio::time::sleep(Duration::from_millis(30)).await;
        }
        self.inner.save_stage(module_id, stage, at).await
    }

    async fn list_stages(&self) -> Result<Vec<StageRecord>, StorageError> {
        self.inner.list_stages().await
    }

    async fn clear_stages(&self, module_id: Option<&ModuleId>) -> Result<u64, StorageError> {
        self.inner.clear_stages(module_id).await
    }
}

#[tokio::test]
async fn concurrent_applies_persist_in_issue_order() {
    let (services, _) = services();
    let module = services.module(&ModuleId::new("ollama").unwrap()).unwrap();
    let id = module.id().clone();
    let inner = InMemoryRepository::new();
    let stages = Arc::new(SlowStages {
        inner: inner.clone(),
        slow_stage: 1,
    });
    let runner = TutorialRunner::new(
        fixed_clock(),
        stages,
        Arc::new(CountingTracker::default()),
    );

    let mut controller = runner
        .open(Arc::clone(&module), services.settings())
        .await
        .unwrap();
    let batches = vec![controller.start(), controller.next(), controller.next()];

    // One task per action, the way the module view dispatches them.
    let tasks: Vec<_> = batches
        .into_iter()
        .map(|effects| {
            let runner = runner.clone();
            let id = id.clone();
            tokio::spawn(async move { runner.apply(&id, effects).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(controller.position(), StagePosition::InStage(2));
    assert_eq!(inner.load_stage(&id).await.unwrap(), Some(2));
}
