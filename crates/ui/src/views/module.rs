use std::sync::Arc;

use dioxus::prelude::*;
use dioxus_router::{Link, Navigator, use_navigator};
use services::TutorialRunner;
use tutor_core::model::ModuleId;
use tutor_core::{Effect, Screen, StepState, StepperItem, TutorialController};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::overlay::{InlineHelp, ToolChip, use_overlay_host};
use crate::views::quiz::QuizView;
use crate::views::visualizations::StageVisualization;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{TutorialAction, apply_action, markdown_to_html};

const SCROLL_TO_TOP: &str =
    "window.scrollTo(0, 0); document.querySelector('.content')?.scrollTo(0, 0);";
const HELP_OVERLAY_BASE: u32 = 1000;

type Controller = Signal<Option<TutorialController>>;

/// Execute view effects, feeding fade completions back into the controller.
async fn run_effects(
    runner: Arc<TutorialRunner>,
    mut controller: Controller,
    navigator: Navigator,
    module_id: ModuleId,
    effects: Vec<Effect>,
) {
    let mut batch = effects;
    while !batch.is_empty() {
        let view_effects = runner.apply(&module_id, batch).await;
        batch = Vec::new();
        for effect in view_effects {
            match effect {
                Effect::ScrollToTop => {
                    let _ = document::eval(SCROLL_TO_TOP);
                }
                Effect::ScheduleFade { token, after } => {
                    tokio::time::sleep(after).await;
                    if let Some(ctl) = controller.write().as_mut() {
                        batch.extend(apply_action(ctl, TutorialAction::FinishFade(token)));
                    }
                }
                Effect::ScheduleTipFade { token, after } => {
                    tokio::time::sleep(after).await;
                    if let Some(ctl) = controller.write().as_mut() {
                        batch.extend(apply_action(ctl, TutorialAction::FinishTipFade(token)));
                    }
                }
                Effect::SwitchModule(id) => {
                    navigator.push(Route::Module {
                        module_id: id.as_str().to_string(),
                    });
                }
                Effect::PersistStage(_) | Effect::NotifyStarted | Effect::NotifyCompleted => {}
            }
        }
    }
}

#[component]
pub fn ModuleView(module_id: String) -> Element {
    let ctx = use_context::<AppContext>();
    let overlays = use_overlay_host(ctx.settings().hover_grace);
    let navigator = use_navigator();
    let mut controller: Controller = use_signal(|| None);

    let open_ctx = ctx.clone();
    let resource = use_resource(use_reactive((&module_id,), move |(module_id,)| {
        let ctx = open_ctx.clone();
        async move {
            let module = ctx.module(&module_id).ok_or(ViewError::NotFound)?;
            let opened = ctx
                .runner()
                .open(module, ctx.settings())
                .await
                .map_err(|err| {
                    tracing::warn!(module = %module_id, error = %err, "failed to open module");
                    ViewError::Unknown
                })?;
            controller.set(Some(opened));
            Ok(())
        }
    }));

    let runner = ctx.runner();
    let dispatch = use_callback(move |action: TutorialAction| {
        let (module_id, effects) = {
            let mut guard = controller.write();
            let Some(ctl) = guard.as_mut() else {
                return;
            };
            (ctl.module().id().clone(), apply_action(ctl, action))
        };
        if effects.is_empty() {
            return;
        }
        let runner = Arc::clone(&runner);
        spawn(run_effects(runner, controller, navigator, module_id, effects));
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div {
            class: "page module",
            tabindex: "-1",
            onkeydown: move |evt| {
                if matches!(evt.data.key(), Key::Escape) {
                    overlays.escape();
                }
            },
            onclick: move |_| overlays.click_outside(),

            match state {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err @ ViewError::NotFound) => rsx! {
                    p { "{err.message()}" }
                    Link { class: "btn btn-secondary", to: Route::Home {}, "Back to overview" }
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
                ViewState::Ready(()) => match controller.read().as_ref() {
                    None => rsx! {
                        p { "Loading..." }
                    },
                    Some(ctl) => render_screen(ctl, &ctx, dispatch),
                },
            }
        }
    }
}

fn render_screen(
    ctl: &TutorialController,
    ctx: &AppContext,
    dispatch: Callback<TutorialAction>,
) -> Element {
    let module = ctl.module();
    match ctl.screen() {
        Screen::Entry => rsx! {
            section { class: "module-entry",
                h2 { "{module.title()}" }
                p { class: "lede", "{module.tagline()}" }
                p { class: "muted", "{module.stage_count()} short stages" }
                button {
                    class: "btn btn-primary",
                    onclick: move |_| dispatch.call(TutorialAction::Start),
                    "Start"
                }
            }
        },
        Screen::Stage(index) => render_stage(ctl, index, dispatch),
        Screen::Summary => render_summary(ctl, ctx, dispatch),
        Screen::Quiz => {
            let next_module = ctx
                .module_after(module.id())
                .map(|next| (next.id().clone(), next.title().to_string()));
            rsx! {
                QuizView {
                    key: "{module.id()}",
                    module_id: module.id().clone(),
                    questions: module.quiz().to_vec(),
                    next_module,
                    on_back: move |()| dispatch.call(TutorialAction::QuizBack),
                    on_start_over: move |()| dispatch.call(TutorialAction::StartOver),
                    on_switch_module: move |id| dispatch.call(TutorialAction::SwitchModule(id)),
                }
            }
        }
    }
}

fn step_class(item: &StepperItem) -> &'static str {
    match item.state {
        StepState::Current => "step current",
        StepState::Visited => "step visited",
        StepState::Locked => "step locked",
    }
}

#[component]
fn Stepper(items: Vec<StepperItem>, percent: u8, on_select: EventHandler<usize>) -> Element {
    rsx! {
        div { class: "stepper",
            div { class: "progress-track",
                div { class: "progress-fill", style: "width: {percent}%;" }
            }
            ol { class: "stepper-steps",
                for item in items {
                    li { key: "{item.index}",
                        ToolChip {
                            id: u32::try_from(item.index).unwrap_or(u32::MAX),
                            tooltip: item.tooltip.clone(),
                            button {
                                class: step_class(&item),
                                disabled: !item.is_clickable(),
                                aria_current: if item.state == StepState::Current { "step" } else { "false" },
                                onclick: move |_| on_select.call(item.index),
                                "{item.index + 1}. {item.label}"
                            }
                        }
                    }
                }
            }
        }
    }
}

fn render_stage(ctl: &TutorialController, index: usize, dispatch: Callback<TutorialAction>) -> Element {
    let module = ctl.module();
    let Some(stage) = module.stage(index) else {
        return rsx! {};
    };
    let explanation = markdown_to_html(stage.explanation());
    let fading = ctl.is_fading();
    let frame_class = if fading { "stage-frame fading" } else { "stage-frame" };
    let help_id = HELP_OVERLAY_BASE + u32::try_from(index).unwrap_or(0);
    let tip = ctl.live_tip().cloned();
    let tip_class = if ctl.tip_is_fading() { "learn-tip fading" } else { "learn-tip" };
    let next_label = if ctl.is_last_stage() { "Finish" } else { "Next" };

    rsx! {
        header { class: "module-header",
            h2 { "{module.title()}" }
        }
        if ctl.welcome_visible() {
            div { class: "welcome-banner", role: "status",
                p { "Welcome! Work through each stage at your own pace. You can jump back to any stage you have seen." }
                button {
                    class: "btn btn-link",
                    onclick: move |_| dispatch.call(TutorialAction::DismissWelcome),
                    "Got it"
                }
            }
        }
        Stepper {
            items: ctl.stepper(),
            percent: ctl.progress_percent(),
            on_select: move |target| dispatch.call(TutorialAction::GoTo(target)),
        }
        section { key: "{stage.key()}", class: frame_class,
            div { class: "stage-heading",
                h3 { "{stage.label()}" }
                InlineHelp {
                    id: help_id,
                    label: "About this stage",
                    text: stage.tooltip().to_string(),
                }
            }
            div { class: "stage-explanation", dangerous_inner_html: "{explanation}" }
            StageVisualization {
                key: "{stage.key()}",
                kind: stage.visualization().clone(),
                active: !fading,
            }
        }
        if let Some(tip) = tip {
            aside { class: tip_class, role: "note",
                p { "{tip.text}" }
                button {
                    class: "btn btn-link",
                    onclick: move |_| dispatch.call(TutorialAction::DismissTip),
                    "Dismiss"
                }
            }
        }
        nav { class: "stage-nav",
            button {
                class: "btn btn-link",
                onclick: move |_| dispatch.call(TutorialAction::StartOver),
                "Start over"
            }
            button {
                class: "btn btn-secondary",
                disabled: index == 0 || fading,
                onclick: move |_| dispatch.call(TutorialAction::Back),
                "Back"
            }
            button {
                class: "btn btn-primary",
                disabled: fading,
                onclick: move |_| dispatch.call(TutorialAction::Next),
                "{next_label}"
            }
        }
    }
}

fn render_summary(
    ctl: &TutorialController,
    ctx: &AppContext,
    dispatch: Callback<TutorialAction>,
) -> Element {
    let module = ctl.module();
    let summary = module.summary().clone();
    let has_quiz = !module.quiz().is_empty();
    let next = ctx.module_after(module.id());
    let next_title = next.as_ref().map(|next| next.title().to_string());
    let next_id = next.map(|next| next.id().clone());

    rsx! {
        section { class: "module-summary",
            h2 { "{module.title()}: complete" }
            p { class: "lede", "{summary.headline}" }
            ul { class: "takeaways",
                for (index, takeaway) in summary.takeaways.iter().enumerate() {
                    li { key: "{index}", "{takeaway}" }
                }
            }
            h3 { "Review a stage" }
            ol { class: "review-stages",
                for item in ctl.stepper() {
                    li { key: "{item.index}",
                        button {
                            class: "btn btn-link",
                            onclick: move |_| dispatch.call(TutorialAction::GoTo(item.index)),
                            "{item.label}"
                        }
                    }
                }
            }
            div { class: "summary-actions",
                if has_quiz {
                    button {
                        class: "btn btn-primary",
                        onclick: move |_| dispatch.call(TutorialAction::OpenQuiz),
                        "Test your knowledge"
                    }
                }
                button {
                    class: "btn btn-secondary",
                    onclick: move |_| dispatch.call(TutorialAction::StartOver),
                    "Start over"
                }
                if let (Some(title), Some(id)) = (next_title, next_id) {
                    button {
                        class: "btn btn-secondary",
                        onclick: move |_| dispatch.call(TutorialAction::SwitchModule(id.clone())),
                        "Next: {title}"
                    }
                }
            }
        }
    }
}
