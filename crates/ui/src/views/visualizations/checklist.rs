use dioxus::prelude::*;
use tutor_core::model::ChoiceItem;
use tutor_core::visualization::Checklist;

#[component]
pub fn ChecklistViz(items: Vec<ChoiceItem>) -> Element {
    let keys: Vec<String> = items.iter().map(|item| item.key.clone()).collect();
    let mut checklist = use_signal(|| Checklist::new(keys));
    let mut expanded = use_signal(|| None::<String>);

    let state = checklist.read();
    let checked = state.checked_count();
    let total = items.len();
    let done = state.all_checked();

    rsx! {
        div { class: "viz viz-checklist",
            ul {
                for item in items.iter() {
                    li {
                        key: "{item.key}",
                        class: if state.is_checked(&item.key) { "check-item checked" } else { "check-item" },
                        label {
                            input {
                                r#type: "checkbox",
                                checked: state.is_checked(&item.key),
                                onchange: {
                                    let key = item.key.clone();
                                    move |_| {
                                        checklist.write().toggle(&key);
                                        expanded.set(Some(key.clone()));
                                    }
                                },
                            }
                            " {item.label}"
                        }
                        if expanded().as_deref() == Some(item.key.as_str()) {
                            p { class: "check-detail", "{item.detail}" }
                        }
                    }
                }
            }
            p { class: "viz-status",
                if done { "All {total} covered." } else { "{checked} of {total} checked" }
            }
            button {
                class: "btn btn-secondary",
                disabled: checked == 0,
                onclick: move |_| {
                    checklist.write().reset();
                    expanded.set(None);
                },
                "Reset"
            }
        }
    }
}
