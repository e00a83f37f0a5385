use dioxus::prelude::*;
use tutor_core::model::{ModuleId, QuizQuestion, QuizSession};

fn choice_class(index: usize, answer: Option<usize>, correct: usize) -> &'static str {
    match answer {
        None => "quiz-choice",
        Some(_) if index == correct => "quiz-choice correct",
        Some(chosen) if chosen == index => "quiz-choice wrong",
        Some(_) => "quiz-choice muted",
    }
}

/// Record `choice` for the current question; refused answers are logged and
/// leave the session untouched.
fn record_answer(session: &mut QuizSession, choice: usize) -> Option<bool> {
    match session.answer(choice) {
        Ok(correct) => Some(correct),
        Err(err) => {
            tracing::debug!(choice, error = %err, "quiz answer refused");
            None
        }
    }
}

/// End-of-module knowledge check.
#[component]
pub fn QuizView(
    module_id: ModuleId,
    questions: Vec<QuizQuestion>,
    /// Id and title of the module offered after this one.
    #[props(!optional)]
    next_module: Option<(ModuleId, String)>,
    on_back: EventHandler<()>,
    on_start_over: EventHandler<()>,
    on_switch_module: EventHandler<ModuleId>,
) -> Element {
    let mut session = use_signal(|| QuizSession::new(questions.clone()));
    let state = session.read();

    if state.is_finished() {
        let result = state.result();
        return rsx! {
            section { class: "quiz quiz-result",
                h3 { "Quiz complete" }
                p { class: "quiz-score", "You scored {result.score} of {result.total} ({result.percent()}%)." }
                div { class: "quiz-actions",
                    button {
                        class: "btn btn-secondary",
                        onclick: move |_| session.write().restart(),
                        "Retake quiz"
                    }
                    button {
                        class: "btn btn-secondary",
                        onclick: move |_| on_back.call(()),
                        "Back to summary"
                    }
                    button {
                        class: "btn btn-secondary",
                        onclick: move |_| on_start_over.call(()),
                        "Start over"
                    }
                    if let Some((next_id, title)) = next_module {
                        button {
                            class: "btn btn-primary",
                            onclick: move |_| on_switch_module.call(next_id.clone()),
                            "Next: {title}"
                        }
                    }
                }
            }
        };
    }

    let Some(question) = state.current_question().cloned() else {
        return rsx! {};
    };
    let answer = state.current_answer();
    let number = state.current_index() + 1;
    let total = state.total();
    let correct = question.correct_index();

    rsx! {
        section { class: "quiz",
            p { class: "quiz-counter", "Question {number} of {total}" }
            h3 { "{question.question()}" }
            div { class: "quiz-choices",
                for (index, choice) in question.choices().iter().enumerate() {
                    button {
                        key: "{index}",
                        class: choice_class(index, answer, correct),
                        disabled: answer.is_some(),
                        onclick: move |_| {
                            record_answer(&mut session.write(), index);
                        },
                        "{choice}"
                    }
                }
            }
            if let Some(chosen) = answer {
                p { class: "quiz-feedback",
                    if chosen == correct { "Correct!" } else { "Not quite." }
                }
                button {
                    class: "btn btn-primary",
                    onclick: {
                        let module_id = module_id.clone();
                        move |_| {
                            let mut session = session;
                            session.write().advance();
                            let quiz = session.peek();
                            if quiz.is_finished() {
                                let result = quiz.result();
                                tracing::info!(
                                    module = %module_id,
                                    score = result.score,
                                    total = result.total,
                                    "quiz finished"
                                );
                            }
                        }
                    },
                    if number == total { "See results" } else { "Next question" }
                }
            }
            button {
                class: "btn btn-link",
                onclick: move |_| on_back.call(()),
                "Back to summary"
            }
        }
    }
}
