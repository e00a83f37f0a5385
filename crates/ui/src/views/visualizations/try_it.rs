use dioxus::prelude::*;
use tutor_core::visualization::{RunState, TryItPanel};

use crate::context::AppContext;

#[component]
pub fn TryItViz(#[props(!optional)] system: Option<String>, prompt: String) -> Element {
    let ctx = use_context::<AppContext>();
    let service = ctx.try_it();
    let enabled = service.enabled();
    let sampling = service.default_sampling();
    let mut panel = use_signal(|| TryItPanel::new(system.clone(), prompt.clone(), sampling));

    let state = panel.read();
    let can_run = enabled && state.can_run();
    let temperature = state.sampling().temperature;
    let running = state.is_running();

    rsx! {
        div { class: "viz viz-try-it",
            textarea {
                class: "try-it-prompt",
                rows: "4",
                value: "{state.prompt()}",
                disabled: running,
                oninput: move |evt| panel.write().set_prompt(evt.value()),
            }
            label { class: "try-it-knob",
                "Temperature {temperature:.1}"
                input {
                    r#type: "range",
                    min: "0",
                    max: "2",
                    step: "0.1",
                    value: "{temperature}",
                    disabled: running,
                    oninput: move |evt| {
                        if let Ok(value) = evt.value().parse::<f32>() {
                            panel.write().sampling_mut().temperature = value;
                        }
                    },
                }
            }
            button {
                class: "btn btn-primary",
                disabled: !can_run,
                onclick: move |_| {
                    let Some(request) = panel.write().begin_run() else {
                        return;
                    };
                    let service = service.clone();
                    spawn(async move {
                        let outcome = service.run(&request).await;
                        panel.write().finish(outcome);
                    });
                },
                if running { "Running..." } else { "Run" }
            }
            if !enabled {
                p { class: "muted", "Set TUTOR_AI_API_KEY to try prompts against a live model." }
            }
            match state.state() {
                RunState::Idle => rsx! {},
                RunState::Running => rsx! {
                    p { class: "try-it-status", "Waiting for the model..." }
                },
                RunState::Succeeded(output) => rsx! {
                    pre { class: "try-it-output", "{output}" }
                },
                RunState::Failed(message) => rsx! {
                    p { class: "try-it-error", role: "alert", "{message}" }
                },
            }
        }
    }
}
