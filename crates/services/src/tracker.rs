use std::sync::Arc;

use async_trait::async_trait;
use storage::repository::ModuleActivityRepository;
use tutor_core::model::ModuleId;

use crate::Clock;

/// Receives start and completion notifications for modules.
///
/// Calls are fire-and-forget and must be safe to repeat.
#[async_trait]
pub trait ProgressTracker: Send + Sync {
    async fn mark_module_started(&self, module_id: &ModuleId);

    async fn mark_module_complete(&self, module_id: &ModuleId);
}

/// Tracker that records activity through a repository.
///
/// Storage failures are logged and swallowed so a broken database never
/// blocks navigation.
#[derive(Clone)]
pub struct RecordingTracker {
    clock: Clock,
    activity: Arc<dyn ModuleActivityRepository>,
}

impl RecordingTracker {
    #[must_use]
    pub fn new(clock: Clock, activity: Arc<dyn ModuleActivityRepository>) -> Self {
        Self { clock, activity }
    }
}

#[async_trait]
impl ProgressTracker for RecordingTracker {
    async fn mark_module_started(&self, module_id: &ModuleId) {
        if let Err(err) = self
            .activity
            .record_started(module_id, self.clock.now())
            .await
        {
            tracing::warn!(module = %module_id, error = %err, "failed to record module start");
        }
    }

    async fn mark_module_complete(&self, module_id: &ModuleId) {
        if let Err(err) = self
            .activity
            .record_completed(module_id, self.clock.now())
            .await
        {
            tracing::warn!(module = %module_id, error = %err, "failed to record module completion");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;
    use tutor_core::time::{fixed_clock, fixed_now};

    #[tokio::test]
    async fn repeated_completion_keeps_first_timestamp() {
        let repo = Arc::new(InMemoryRepository::new());
        let mut clock = fixed_clock();
        let id = ModuleId::new("ollama").unwrap();

        RecordingTracker::new(clock, repo.clone())
            .mark_module_complete(&id)
            .await;
        clock.advance(chrono::Duration::minutes(5));
        RecordingTracker::new(clock, repo.clone())
            .mark_module_complete(&id)
            .await;

        let activity = repo.get_activity(&id).await.unwrap().unwrap();
        assert_eq!(activity.completed_at, Some(fixed_now()));
    }
}
