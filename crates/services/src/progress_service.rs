use std::collections::HashMap;
use std::sync::Arc;

use storage::repository::{ModuleActivityRepository, StageProgressRepository, StorageError};
use tutor_core::model::{Module, ModuleId, StagePosition};

/// Badge shown for a module on the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStatus {
    NotStarted,
    /// One-based stage number out of `of`.
    InProgress { stage: usize, of: usize },
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOverview {
    pub id: ModuleId,
    pub title: String,
    pub tagline: String,
    pub status: ModuleStatus,
    /// Completed at least once, even if restarted since.
    pub ever_completed: bool,
}

/// Read and reset persisted progress across modules.
#[derive(Clone)]
pub struct ProgressService {
    stages: Arc<dyn StageProgressRepository>,
    activity: Arc<dyn ModuleActivityRepository>,
}

impl ProgressService {
    #[must_use]
    pub fn new(
        stages: Arc<dyn StageProgressRepository>,
        activity: Arc<dyn ModuleActivityRepository>,
    ) -> Self {
        Self { stages, activity }
    }

    /// Status of every module in `modules`, in the same order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if repository access fails.
    pub async fn overview(&self, modules: &[Arc<Module>]) -> Result<Vec<ModuleOverview>, StorageError> {
        let stages: HashMap<_, _> = self
            .stages
            .list_stages()
            .await?
            .into_iter()
            .map(|record| (record.module_id, record.current_stage))
            .collect();
        let completed: HashMap<_, _> = self
            .activity
            .list_activity()
            .await?
            .into_iter()
            .map(|activity| {
                let done = activity.is_completed();
                (activity.module_id, done)
            })
            .collect();

        Ok(modules
            .iter()
            .map(|module| {
                let count = module.stage_count();
                let status = match stages.get(module.id()) {
                    None => ModuleStatus::NotStarted,
                    Some(value) => match StagePosition::from_persisted(*value, count) {
                        StagePosition::NotStarted => ModuleStatus::NotStarted,
                        StagePosition::InStage(index) => ModuleStatus::InProgress {
                            stage: index + 1,
                            of: count,
                        },
                        StagePosition::Finished => ModuleStatus::Completed,
                    },
                };
                ModuleOverview {
                    id: module.id().clone(),
                    title: module.title().to_string(),
                    tagline: module.tagline().to_string(),
                    status,
                    ever_completed: completed.get(module.id()).copied().unwrap_or(false),
                }
            })
            .collect())
    }

    /// Forget the persisted stage of one module, or of every module.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    pub async fn reset(&self, module_id: Option<&ModuleId>) -> Result<u64, StorageError> {
        let removed = self.stages.clear_stages(module_id).await?;
        tracing::info!(module = ?module_id.map(ModuleId::as_str), removed, "reset progress");
        Ok(removed)
    }
}
