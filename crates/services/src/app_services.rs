use std::sync::Arc;

use storage::repository::Storage;
use tutor_core::catalog;
use tutor_core::model::{Module, ModuleId, SamplingSettings};
use tutor_core::TutorialSettings;

use crate::Clock;
use crate::completion_service::{CompletionClient, HttpCompletionClient};
use crate::error::AppServicesError;
use crate::progress_service::ProgressService;
use crate::tracker::RecordingTracker;
use crate::try_it::TryItService;
use crate::tutorial::TutorialRunner;

/// Assembles app-facing services and the module catalog.
#[derive(Clone)]
pub struct AppServices {
    modules: Arc<Vec<Arc<Module>>>,
    settings: TutorialSettings,
    runner: Arc<TutorialRunner>,
    progress: Arc<ProgressService>,
    try_it: Arc<TryItService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the HTTP completion
    /// client configured from the environment.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the
    /// built-in content is invalid.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        settings: TutorialSettings,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let http = HttpCompletionClient::from_env();
        let sampling = http.default_sampling();
        let try_it = TryItService::new(Arc::new(http), sampling);
        Self::from_parts(&storage, clock, settings, try_it)
    }

    /// Build services over an existing storage and completion client.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Content` if the built-in content is invalid.
    pub fn with_storage(
        storage: &Storage,
        clock: Clock,
        settings: TutorialSettings,
        completion: Arc<dyn CompletionClient>,
    ) -> Result<Self, AppServicesError> {
        let try_it = TryItService::new(completion, SamplingSettings::default());
        Self::from_parts(storage, clock, settings, try_it)
    }

    fn from_parts(
        storage: &Storage,
        clock: Clock,
        settings: TutorialSettings,
        try_it: TryItService,
    ) -> Result<Self, AppServicesError> {
        let modules = catalog::builtin_modules()?
            .into_iter()
            .map(Arc::new)
            .collect::<Vec<_>>();
        let tracker = Arc::new(RecordingTracker::new(clock, Arc::clone(&storage.activity)));
        let runner = Arc::new(TutorialRunner::new(
            clock,
            Arc::clone(&storage.stages),
            tracker,
        ));
        let progress = Arc::new(ProgressService::new(
            Arc::clone(&storage.stages),
            Arc::clone(&storage.activity),
        ));

        Ok(Self {
            modules: Arc::new(modules),
            settings,
            runner,
            progress,
            try_it: Arc::new(try_it),
        })
    }

    #[must_use]
    pub fn modules(&self) -> &[Arc<Module>] {
        &self.modules
    }

    #[must_use]
    pub fn module(&self, id: &ModuleId) -> Option<Arc<Module>> {
        self.modules
            .iter()
            .find(|module| module.id() == id)
            .map(Arc::clone)
    }

    #[must_use]
    pub fn settings(&self) -> TutorialSettings {
        self.settings
    }

    #[must_use]
    pub fn runner(&self) -> Arc<TutorialRunner> {
        Arc::clone(&self.runner)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn try_it(&self) -> Arc<TryItService> {
        Arc::clone(&self.try_it)
    }
}
