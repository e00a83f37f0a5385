use dioxus::prelude::*;
use dioxus_router::{Link, use_navigator};
use services::{ModuleOverview, ModuleStatus};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{status_badge, status_cta};

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();

    let launch_ctx = ctx.clone();
    use_effect(move || {
        if let Some(module_id) = launch_ctx.take_initial_module() {
            navigator.push(Route::Module {
                module_id: module_id.as_str().to_string(),
            });
        }
    });

    let progress = ctx.progress();
    let modules = ctx.modules().to_vec();
    let resource = use_resource(move || {
        let progress = progress.clone();
        let modules = modules.clone();
        async move {
            progress.overview(&modules).await.map_err(|err| {
                tracing::warn!(error = %err, "failed to load module overview");
                ViewError::Unknown
            })
        }
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page home",
            h2 { "Learn how modern AI works" }
            p { class: "lede", "Short interactive modules. Pick one to begin." }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        onclick: move |_| {
                            let mut resource = resource;
                            resource.restart();
                        },
                        "Retry"
                    }
                },
                ViewState::Ready(items) => rsx! {
                    ul { class: "module-grid",
                        for item in items {
                            ModuleCard { key: "{item.id}", item }
                        }
                    }
                },
            }
        }
    }
}

#[component]
fn ModuleCard(item: ModuleOverview) -> Element {
    let badge = status_badge(item.status);
    let cta = status_cta(item.status);

    rsx! {
        li { class: "module-card",
            div { class: "module-card-header",
                h3 { "{item.title}" }
                span { class: badge.class, "{badge.label}" }
                if item.ever_completed && item.status != ModuleStatus::Completed {
                    span { class: "badge badge-done", "Completed before" }
                }
            }
            p { "{item.tagline}" }
            Link {
                class: "btn btn-primary",
                to: Route::Module { module_id: item.id.as_str().to_string() },
                "{cta}"
            }
        }
    }
}
