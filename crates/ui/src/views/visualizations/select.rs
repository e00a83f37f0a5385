use dioxus::prelude::*;
use tutor_core::model::ChoiceItem;
use tutor_core::visualization::SingleSelect;

fn option_class(selected: bool, visited: bool) -> &'static str {
    match (selected, visited) {
        (true, _) => "select-option selected",
        (false, true) => "select-option visited",
        (false, false) => "select-option",
    }
}

#[component]
pub fn SelectViz(options: Vec<ChoiceItem>) -> Element {
    let keys: Vec<String> = options.iter().map(|option| option.key.clone()).collect();
    let mut select = use_signal(|| SingleSelect::new(keys));

    let state = select.read();
    let detail = state
        .selected()
        .and_then(|key| options.iter().find(|option| &option.key == key))
        .map(|option| option.detail.clone());

    rsx! {
        div { class: "viz viz-select",
            div { class: "select-grid",
                for option in options.iter() {
                    button {
                        key: "{option.key}",
                        class: option_class(
                            state.selected() == Some(&option.key),
                            state.is_visited(&option.key),
                        ),
                        aria_pressed: state.selected() == Some(&option.key),
                        onclick: {
                            let key = option.key.clone();
                            move |_| select.write().select(&key)
                        },
                        "{option.label}"
                    }
                }
            }
            if let Some(detail) = detail {
                p { class: "select-detail", "{detail}" }
            } else {
                p { class: "select-detail muted", "Pick a card to learn more." }
            }
            if state.all_visited() {
                p { class: "viz-status", "You've seen them all." }
            }
        }
    }
}
