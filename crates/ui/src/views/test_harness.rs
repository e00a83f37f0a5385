use std::sync::Arc;

use async_trait::async_trait;
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use services::{
    AppServices, CompletionClient, CompletionError, ProgressService, TryItService,
    TutorialRunner,
};
use storage::repository::Storage;
use tutor_core::TutorialSettings;
use tutor_core::model::{CompletionRequest, Module, ModuleId};
use tutor_core::time::fixed_clock;

use crate::context::{UiApp, build_app_context};
use crate::views::{HomeView, ModuleView};

struct EchoClient;

#[async_trait]
impl CompletionClient for EchoClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        request
            .messages
            .last()
            .map(|message| message.content.clone())
            .ok_or(CompletionError::EmptyResponse)
    }
}

#[derive(Clone)]
struct TestApp {
    services: AppServices,
}

impl UiApp for TestApp {
    fn modules(&self) -> Vec<Arc<Module>> {
        self.services.modules().to_vec()
    }

    fn settings(&self) -> TutorialSettings {
        self.services.settings()
    }

    fn initial_module(&self) -> Option<ModuleId> {
        None
    }

    fn runner(&self) -> Arc<TutorialRunner> {
        self.services.runner()
    }

    fn progress(&self) -> Arc<ProgressService> {
        self.services.progress()
    }

    fn try_it(&self) -> Arc<TryItService> {
        self.services.try_it()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Module(&'static str),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ViewHarnessProps {}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::Module(module_id) => rsx! { ModuleView { module_id: module_id.to_string() } },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Rebuild, then let resources resolve.
    pub async fn settle(&mut self) {
        self.rebuild();
        for _ in 0..4 {
            self.drive_async().await;
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn setup_view_harness(view: ViewKind, storage: &Storage) -> ViewHarness {
    let services = AppServices::with_storage(
        storage,
        fixed_clock(),
        TutorialSettings::instant(),
        Arc::new(EchoClient),
    )
    .expect("built-in content is valid");
    let app = Arc::new(TestApp { services });

    let dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app, view });

    ViewHarness { dom }
}
