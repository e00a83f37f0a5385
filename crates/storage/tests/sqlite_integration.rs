use chrono::Duration;
use storage::repository::{
    ModuleActivityRepository, StageProgressRepository, Storage, load_stage_or_default,
};
use storage::sqlite::SqliteRepository;
use tutor_core::model::{ModuleId, NOT_STARTED};
use tutor_core::time::fixed_now;

fn module(id: &str) -> ModuleId {
    ModuleId::new(id).unwrap()
}

#[tokio::test]
async fn sqlite_persists_stage_per_module() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_stages?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let safety = module("ai-safety");
    let agents = module("agentic-ai");
    assert_eq!(
        load_stage_or_default(&repo, &safety).await.unwrap(),
        NOT_STARTED
    );

    repo.save_stage(&safety, 0, fixed_now()).await.unwrap();
    repo.save_stage(&safety, 2, fixed_now() + Duration::minutes(1))
        .await
        .unwrap();
    repo.save_stage(&agents, 5, fixed_now()).await.unwrap();

    assert_eq!(repo.load_stage(&safety).await.unwrap(), Some(2));
    assert_eq!(repo.load_stage(&agents).await.unwrap(), Some(5));

    let records = repo.list_stages().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].module_id, agents);
    assert_eq!(records[1].updated_at, fixed_now() + Duration::minutes(1));

    assert_eq!(repo.clear_stages(Some(&safety)).await.unwrap(), 1);
    assert_eq!(repo.load_stage(&safety).await.unwrap(), None);
    assert_eq!(repo.clear_stages(None).await.unwrap(), 1);
}

#[tokio::test]
async fn sqlite_activity_keeps_first_start_and_completion() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_activity?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let id = module("ollama");
    let first = fixed_now();
    let later = first + Duration::hours(2);

    repo.record_started(&id, first).await.unwrap();
    repo.record_started(&id, later).await.unwrap();
    repo.record_completed(&id, later).await.unwrap();
    repo.record_completed(&id, later + Duration::hours(1))
        .await
        .unwrap();

    let activity = repo.get_activity(&id).await.unwrap().expect("activity");
    assert_eq!(activity.started_at, Some(first));
    assert_eq!(activity.completed_at, Some(later));
    assert_eq!(activity.start_count, 2);

    let other = module("prompt-engineering");
    repo.record_completed(&other, first).await.unwrap();
    let listed = repo.list_activity().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[1].module_id, other);
    assert_eq!(listed[1].start_count, 0);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");

    let storage = Storage::sqlite("sqlite:file:memdb_migrate?mode=memory&cache=shared")
        .await
        .expect("storage");
    storage
        .stages
        .save_stage(&module("ai-safety"), 1, fixed_now())
        .await
        .unwrap();
    assert_eq!(
        repo.load_stage(&module("ai-safety")).await.unwrap(),
        Some(1)
    );
}
