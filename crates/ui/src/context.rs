use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use services::{ProgressService, TryItService, TutorialRunner};
use tutor_core::TutorialSettings;
use tutor_core::model::{Module, ModuleId};

pub trait UiApp: Send + Sync {
    fn modules(&self) -> Vec<Arc<Module>>;
    fn settings(&self) -> TutorialSettings;
    /// Module to open right after launch, if any.
    fn initial_module(&self) -> Option<ModuleId>;

    fn runner(&self) -> Arc<TutorialRunner>;
    fn progress(&self) -> Arc<ProgressService>;
    fn try_it(&self) -> Arc<TryItService>;
}

#[derive(Clone)]
pub struct AppContext {
    modules: Arc<Vec<Arc<Module>>>,
    settings: TutorialSettings,
    initial_module: Option<ModuleId>,
    initial_module_once: Arc<AtomicBool>,

    runner: Arc<TutorialRunner>,
    progress: Arc<ProgressService>,
    try_it: Arc<TryItService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        let initial_module = app.initial_module();

        Self {
            modules: Arc::new(app.modules()),
            settings: app.settings(),
            initial_module_once: Arc::new(AtomicBool::new(initial_module.is_some())),
            initial_module,
            runner: app.runner(),
            progress: app.progress(),
            try_it: app.try_it(),
        }
    }

    #[must_use]
    pub fn modules(&self) -> &[Arc<Module>] {
        &self.modules
    }

    #[must_use]
    pub fn module(&self, id: &str) -> Option<Arc<Module>> {
        self.modules
            .iter()
            .find(|module| module.id().as_str() == id)
            .map(Arc::clone)
    }

    /// The module listed after `id`, used for the "next module" hand-off.
    #[must_use]
    pub fn module_after(&self, id: &ModuleId) -> Option<Arc<Module>> {
        let index = self.modules.iter().position(|module| module.id() == id)?;
        self.modules.get(index + 1).map(Arc::clone)
    }

    #[must_use]
    pub fn settings(&self) -> TutorialSettings {
        self.settings
    }

    /// Returns the launch module exactly once; later calls return `None`.
    #[must_use]
    pub fn take_initial_module(&self) -> Option<ModuleId> {
        if self.initial_module_once.swap(false, Ordering::AcqRel) {
            self.initial_module.clone()
        } else {
            None
        }
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

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
