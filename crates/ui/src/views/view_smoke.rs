use std::sync::Arc;

use chrono::{DateTime, Utc};
use storage::repository::{StageProgressRepository, StageRecord, Storage, StorageError};
use tutor_core::model::ModuleId;
use tutor_core::time::fixed_now;

use super::test_harness::{ViewKind, setup_view_harness};

async fn seed_stage(storage: &Storage, module: &str, stage: i64) {
    storage
        .stages
        .save_stage(&ModuleId::new(module).unwrap(), stage, fixed_now())
        .await
        .expect("seed stage");
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_renders_modules_and_badges() {
    let storage = Storage::in_memory();
    seed_stage(&storage, "ai-safety", 1).await;

    let mut harness = setup_view_harness(ViewKind::Home, &storage);
    harness.settle().await;
    let html = harness.render();

    for title in ["AI Safety", "Agentic AI", "Local Models with Ollama", "Prompt Engineering"] {
        assert!(html.contains(title), "missing {title} in {html}");
    }
    assert!(html.contains("Stage 2 of 5"), "missing progress badge in {html}");
    assert!(html.contains("Not started"), "missing idle badge in {html}");
    assert!(html.contains("Continue"), "missing continue cta in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn module_view_smoke_renders_entry_screen() {
    let storage = Storage::in_memory();
    let mut harness = setup_view_harness(ViewKind::Module("ai-safety"), &storage);
    harness.settle().await;
    let html = harness.render();

    assert!(html.contains("AI Safety"), "missing title in {html}");
    assert!(html.contains("5 short stages"), "missing stage count in {html}");
    assert!(html.contains("Start"), "missing start button in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn module_view_smoke_resumes_persisted_stage() {
    let storage = Storage::in_memory();
    seed_stage(&storage, "ai-safety", 1).await;

    let mut harness = setup_view_harness(ViewKind::Module("ai-safety"), &storage);
    harness.settle().await;
    let html = harness.render();

    assert!(html.contains("RLHF"), "missing stage label in {html}");
    assert!(html.contains("reward model"), "missing explanation in {html}");
    assert!(html.contains("Sample answers"), "missing step builder in {html}");
    assert!(html.contains("Back"), "missing back button in {html}");
    assert!(html.contains("Next"), "missing next button in {html}");
    assert!(html.contains("Start over"), "missing start over in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn module_view_smoke_renders_summary_when_finished() {
    let storage = Storage::in_memory();
    seed_stage(&storage, "ai-safety", 5).await;

    let mut harness = setup_view_harness(ViewKind::Module("ai-safety"), &storage);
    harness.settle().await;
    let html = harness.render();

    assert!(
        html.contains("You now know how models are aligned"),
        "missing headline in {html}"
    );
    assert!(html.contains("Test your knowledge"), "missing quiz entry in {html}");
    assert!(html.contains("Start over"), "missing start over in {html}");
    assert!(html.contains("Next: Agentic AI"), "missing next module in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn module_view_smoke_reports_unknown_module() {
    let storage = Storage::in_memory();
    let mut harness = setup_view_harness(ViewKind::Module("no-such-module"), &storage);
    harness.settle().await;
    let html = harness.render();

    assert!(html.contains("Module not found."), "missing not-found text in {html}");
    assert!(html.contains("Back to overview"), "missing home link in {html}");
}

struct FailingStages;

#[async_trait::async_trait]
impl StageProgressRepository for FailingStages {
    async fn load_stage(&self, _module_id: &ModuleId) -> Result<Option<i64>, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn save_stage(
        &self,
        _module_id: &ModuleId,
        _stage: i64,
        _at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn list_stages(&self) -> Result<Vec<StageRecord>, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }

    async fn clear_stages(&self, _module_id: Option<&ModuleId>) -> Result<u64, StorageError> {
        Err(StorageError::Connection("fail".to_string()))
    }
}

fn failing_storage() -> Storage {
    let healthy = Storage::in_memory();
    Storage {
        stages: Arc::new(FailingStages),
        activity: healthy.activity,
    }
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_smoke_renders_error_state() {
    let mut harness = setup_view_harness(ViewKind::Home, &failing_storage());
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Something went wrong"), "missing error in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn module_view_smoke_renders_error_state() {
    let mut harness = setup_view_harness(ViewKind::Module("ollama"), &failing_storage());
    harness.settle().await;
    let html = harness.render();
    assert!(html.contains("Something went wrong"), "missing error in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
}
