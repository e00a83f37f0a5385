use std::sync::Arc;

use storage::repository::StageProgressRepository;
use tokio::sync::Mutex;
use tutor_core::model::{Module, ModuleId};
use tutor_core::{Effect, TutorialController, TutorialSettings};

use crate::Clock;
use crate::error::TutorialError;
use crate::tracker::ProgressTracker;

/// Executes the persistence and tracker effects of a `TutorialController`.
#[derive(Clone)]
pub struct TutorialRunner {
    clock: Clock,
    stages: Arc<dyn StageProgressRepository>,
    tracker: Arc<dyn ProgressTracker>,
    // Batches apply one at a time, in arrival order.
    write_gate: Arc<Mutex<()>>,
}

impl TutorialRunner {
    #[must_use]
    pub fn new(
        clock: Clock,
        stages: Arc<dyn StageProgressRepository>,
        tracker: Arc<dyn ProgressTracker>,
    ) -> Self {
        Self {
            clock,
            stages,
            tracker,
            write_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Build a controller resumed from the persisted stage.
    ///
    /// # Errors
    ///
    /// Returns `TutorialError::Storage` if the stage cannot be read.
    pub async fn open(
        &self,
        module: Arc<Module>,
        settings: TutorialSettings,
    ) -> Result<TutorialController, TutorialError> {
        let persisted = self.stages.load_stage(module.id()).await?;
        tracing::debug!(module = %module.id(), ?persisted, "opening tutorial");
        Ok(TutorialController::resume(module, settings, persisted))
    }

    /// Run persistence and tracker effects, returning the rest in order.
    ///
    /// Concurrent calls are serialized in the order they reach the runner, so
    /// a stage saved by an earlier action never overwrites a later one.
    /// Persistence failures are logged and do not stop later effects.
    pub async fn apply(&self, module_id: &ModuleId, effects: Vec<Effect>) -> Vec<Effect> {
        let _gate = self.write_gate.lock().await;
        let mut remaining = Vec::new();
        for effect in effects {
            match effect {
                Effect::PersistStage(stage) => {
                    if let Err(err) = self
                        .stages
                        .save_stage(module_id, stage, self.clock.now())
                        .await
                    {
                        tracing::warn!(module = %module_id, stage, error = %err, "failed to persist stage");
                    }
                }
                Effect::NotifyStarted => self.tracker.mark_module_started(module_id).await,
                Effect::NotifyCompleted => self.tracker.mark_module_complete(module_id).await,
                other => remaining.push(other),
            }
        }
        remaining
    }
}
