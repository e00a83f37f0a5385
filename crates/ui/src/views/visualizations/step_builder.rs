use dioxus::prelude::*;
use tutor_core::model::ChoiceItem;
use tutor_core::visualization::StepBuilder;

#[component]
pub fn StepBuilderViz(steps: Vec<ChoiceItem>) -> Element {
    let keys: Vec<String> = steps.iter().map(|step| step.key.clone()).collect();
    let mut builder = use_signal(|| StepBuilder::new(keys));

    // Offer the pool alphabetically so the listed order is not a giveaway.
    let mut pool = steps.clone();
    pool.sort_by(|a, b| a.label.cmp(&b.label));

    let state = builder.read();
    let label_of = |key: &String| {
        steps
            .iter()
            .find(|step| &step.key == key)
            .map(|step| step.label.clone())
            .unwrap_or_default()
    };
    let chosen: Vec<(usize, String)> = state
        .chosen()
        .iter()
        .map(label_of)
        .enumerate()
        .collect();
    let complete = state.is_complete();
    let correct = state.is_correct();

    rsx! {
        div { class: "viz viz-steps",
            div { class: "step-pool",
                for step in pool.iter() {
                    button {
                        key: "{step.key}",
                        class: "step-chip",
                        disabled: state.is_chosen(&step.key),
                        onclick: {
                            let key = step.key.clone();
                            move |_| {
                                builder.write().push(&key);
                            }
                        },
                        "{step.label}"
                    }
                }
            }
            ol { class: "step-chosen",
                for (index, label) in chosen {
                    li { key: "chosen-{index}", "{label}" }
                }
            }
            if complete {
                if correct {
                    p { class: "viz-status success", "That's the right order." }
                } else {
                    p { class: "viz-status", "Not quite. Undo a few steps and try again." }
                }
            }
            div { class: "step-actions",
                button {
                    class: "btn btn-secondary",
                    disabled: state.chosen().is_empty(),
                    onclick: move |_| {
                        builder.write().pop();
                    },
                    "Undo"
                }
                button {
                    class: "btn btn-secondary",
                    disabled: state.chosen().is_empty(),
                    onclick: move |_| builder.write().reset(),
                    "Reset"
                }
            }
        }
    }
}
