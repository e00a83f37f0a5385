use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tutor_core::model::{ModuleId, NOT_STARTED};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted stage value for one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRecord {
    pub module_id: ModuleId,
    /// `-1` not started, `0..N-1` in a stage, `N` finished.
    pub current_stage: i64,
    pub updated_at: DateTime<Utc>,
}

/// Start/completion history recorded by the progress tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleActivity {
    pub module_id: ModuleId,
    /// First time the module was started; later starts keep it.
    pub started_at: Option<DateTime<Utc>>,
    /// First completion; later completions keep it.
    pub completed_at: Option<DateTime<Utc>>,
    pub start_count: u32,
}

impl ModuleActivity {
    #[must_use]
    pub fn new(module_id: ModuleId) -> Self {
        Self {
            module_id,
            started_at: None,
            completed_at: None,
            start_count: 0,
        }
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    fn mark_started(&mut self, at: DateTime<Utc>) {
        self.started_at.get_or_insert(at);
        self.start_count = self.start_count.saturating_add(1);
    }

    fn mark_completed(&mut self, at: DateTime<Utc>) {
        self.started_at.get_or_insert(at);
        self.completed_at.get_or_insert(at);
    }
}

/// Repository contract for the per-module stage value.
#[async_trait]
pub trait StageProgressRepository: Send + Sync {
    /// Fetch the persisted stage for a module.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn load_stage(&self, module_id: &ModuleId) -> Result<Option<i64>, StorageError>;

    /// Persist the stage value for a module, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn save_stage(
        &self,
        module_id: &ModuleId,
        stage: i64,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// List every persisted stage record, ordered by module id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn list_stages(&self) -> Result<Vec<StageRecord>, StorageError>;

    /// Forget the stage for one module, or for all modules when `None`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn clear_stages(&self, module_id: Option<&ModuleId>) -> Result<u64, StorageError>;
}

/// Load the persisted stage, defaulting to "not started" when absent.
///
/// # Errors
///
/// Returns `StorageError` if the backend cannot be read.
pub async fn load_stage_or_default(
    repo: &dyn StageProgressRepository,
    module_id: &ModuleId,
) -> Result<i64, StorageError> {
    Ok(repo.load_stage(module_id).await?.unwrap_or(NOT_STARTED))
}

#[async_trait]
pub trait ModuleActivityRepository: Send + Sync {
    /// Record a module start. The first start timestamp is kept.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn record_started(&self, module_id: &ModuleId, at: DateTime<Utc>)
    -> Result<(), StorageError>;

    /// Record a completion. Repeated completions keep the first timestamp.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn record_completed(
        &self,
        module_id: &ModuleId,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_activity(&self, module_id: &ModuleId)
    -> Result<Option<ModuleActivity>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn list_activity(&self) -> Result<Vec<ModuleActivity>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    stages: Arc<Mutex<HashMap<ModuleId, StageRecord>>>,
    activity: Arc<Mutex<HashMap<ModuleId, ModuleActivity>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stages: Arc::new(Mutex::new(HashMap::new())),
            activity: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl StageProgressRepository for InMemoryRepository {
    async fn load_stage(&self, module_id: &ModuleId) -> Result<Option<i64>, StorageError> {
        let guard = self
            .stages
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(module_id).map(|record| record.current_stage))
    }

    async fn save_stage(
        &self,
        module_id: &ModuleId,
        stage: i64,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .stages
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(
            module_id.clone(),
            StageRecord {
                module_id: module_id.clone(),
                current_stage: stage,
                updated_at: at,
            },
        );
        Ok(())
    }

    async fn list_stages(&self) -> Result<Vec<StageRecord>, StorageError> {
        let guard = self
            .stages
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut records: Vec<_> = guard.values().cloned().collect();
        records.sort_by(|a, b| a.module_id.as_str().cmp(b.module_id.as_str()));
        Ok(records)
    }

    async fn clear_stages(&self, module_id: Option<&ModuleId>) -> Result<u64, StorageError> {
        let mut guard = self
            .stages
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let removed = match module_id {
            Some(id) => usize::from(guard.remove(id).is_some()),
            None => {
                let count = guard.len();
                guard.clear();
                count
            }
        };
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }
}

#[async_trait]
impl ModuleActivityRepository for InMemoryRepository {
    async fn record_started(
        &self,
        module_id: &ModuleId,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .activity
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .entry(module_id.clone())
            .or_insert_with(|| ModuleActivity::new(module_id.clone()))
            .mark_started(at);
        Ok(())
    }

    async fn record_completed(
        &self,
        module_id: &ModuleId,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .activity
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .entry(module_id.clone())
            .or_insert_with(|| ModuleActivity::new(module_id.clone()))
            .mark_completed(at);
        Ok(())
    }

    async fn get_activity(
        &self,
        module_id: &ModuleId,
    ) -> Result<Option<ModuleActivity>, StorageError> {
        let guard = self
            .activity
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(module_id).cloned())
    }

    async fn list_activity(&self) -> Result<Vec<ModuleActivity>, StorageError> {
        let guard = self
            .activity
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut records: Vec<_> = guard.values().cloned().collect();
        records.sort_by(|a, b| a.module_id.as_str().cmp(b.module_id.as_str()));
        Ok(records)
    }
}

/// Aggregates the repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub stages: Arc<dyn StageProgressRepository>,
    pub activity: Arc<dyn ModuleActivityRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let stages: Arc<dyn StageProgressRepository> = Arc::new(repo.clone());
        let activity: Arc<dyn ModuleActivityRepository> = Arc::new(repo);
        Self { stages, activity }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_core::time::fixed_now;

    fn module(id: &str) -> ModuleId {
        ModuleId::new(id).unwrap()
    }

    #[tokio::test]
    async fn missing_stage_defaults_to_not_started() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.load_stage(&module("ollama")).await.unwrap(), None);
        assert_eq!(
            load_stage_or_default(&repo, &module("ollama")).await.unwrap(),
            NOT_STARTED
        );
    }

    #[tokio::test]
    async fn save_stage_is_last_write_wins() {
        let repo = InMemoryRepository::new();
        let id = module("ai-safety");
        repo.save_stage(&id, 0, fixed_now()).await.unwrap();
        repo.save_stage(&id, 3, fixed_now()).await.unwrap();
        assert_eq!(repo.load_stage(&id).await.unwrap(), Some(3));
        assert_eq!(repo.list_stages().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn clear_stages_by_module_and_all() {
        let repo = InMemoryRepository::new();
        repo.save_stage(&module("a"), 1, fixed_now()).await.unwrap();
        repo.save_stage(&module("b"), 2, fixed_now()).await.unwrap();

        assert_eq!(repo.clear_stages(Some(&module("a"))).await.unwrap(), 1);
        assert_eq!(repo.load_stage(&module("a")).await.unwrap(), None);
        assert_eq!(repo.clear_stages(None).await.unwrap(), 1);
        assert!(repo.list_stages().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn activity_keeps_first_timestamps() {
        let repo = InMemoryRepository::new();
        let id = module("agentic-ai");
        let first = fixed_now();
        let later = first + chrono::Duration::hours(1);

        repo.record_started(&id, first).await.unwrap();
        repo.record_started(&id, later).await.unwrap();
        repo.record_completed(&id, later).await.unwrap();
        repo.record_completed(&id, later + chrono::Duration::hours(1))
            .await
            .unwrap();

        let activity = repo.get_activity(&id).await.unwrap().unwrap();
        assert_eq!(activity.started_at, Some(first));
        assert_eq!(activity.completed_at, Some(later));
        assert_eq!(activity.start_count, 2);
        assert!(activity.is_completed());
    }
}
