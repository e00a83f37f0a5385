//! Built-in tutorial modules.

use crate::error::Error;
use crate::model::{
    ChoiceItem, DiagramNode, LearnTip, Module, ModuleDraft, ModuleId, QuizQuestion, StageDraft,
    SummaryContent, TipId, VisualizationKind,
};
use crate::sequencer::SequencerEvent;
use crate::settings::TutorialSettings;

/// Every module shipped with the app, in display order.
///
/// # Errors
///
/// Returns an error if any built-in content fails validation.
pub fn builtin_modules() -> Result<Vec<Module>, Error> {
    Ok(vec![
        Module::from_draft(ai_safety()?)?,
        Module::from_draft(agentic_ai()?)?,
        Module::from_draft(local_models()?)?,
        Module::from_draft(prompt_engineering()?)?,
    ])
}

/// Look up a built-in module by id.
///
/// # Errors
///
/// Returns an error if built-in content fails validation.
pub fn find(id: &ModuleId) -> Result<Option<Module>, Error> {
    Ok(builtin_modules()?
        .into_iter()
        .find(|module| module.id() == id))
}

fn stage(
    key: &str,
    label: &str,
    tooltip: &str,
    explanation: &str,
    visualization: VisualizationKind,
) -> StageDraft {
    StageDraft {
        key: key.to_string(),
        label: label.to_string(),
        tooltip: tooltip.to_string(),
        explanation: explanation.to_string(),
        visualization,
    }
}

/// Typed text at the default pace; players retime it from their settings.
fn typed(text: &str) -> SequencerEvent {
    SequencerEvent::type_text(text, TutorialSettings::default().char_delay)
}

fn items(entries: &[(&str, &str, &str)]) -> Vec<ChoiceItem> {
    entries
        .iter()
        .map(|(key, label, detail)| ChoiceItem::new(*key, *label, *detail))
        .collect()
}

fn nodes(labels: &[&str]) -> Vec<DiagramNode> {
    (1_u32..)
        .zip(labels)
        .map(|(id, label)| DiagramNode::new(id, *label))
        .collect()
}

fn question(text: &str, choices: &[&str], correct: usize) -> Result<QuizQuestion, Error> {
    let choices = choices.iter().map(ToString::to_string).collect();
    Ok(QuizQuestion::new(text, choices, correct)?)
}

fn tip(stage: usize, id: u32, text: &str) -> (usize, LearnTip) {
    (stage, LearnTip::new(TipId::new(id), text))
}

fn summary(headline: &str, takeaways: &[&str]) -> SummaryContent {
    SummaryContent {
        headline: headline.to_string(),
        takeaways: takeaways.iter().map(ToString::to_string).collect(),
    }
}

//
// ─── AI SAFETY ────────────────────────────────────────────────────────────────
//

fn ai_safety() -> Result<ModuleDraft, Error> {
    Ok(ModuleDraft {
        id: ModuleId::new("ai-safety")?,
        title: "AI Safety".to_string(),
        tagline: "How models are trained, aligned and kept in check.".to_string(),
        stages: vec![
            stage(
                "pretraining",
                "Pretraining",
                "Learning to predict text",
                "A base model is trained to predict the **next token** over a very large corpus. \
                 It picks up grammar, facts and also the biases of its data.",
                VisualizationKind::Sequence {
                    nodes: nodes(&["Web text", "Tokenizer", "Transformer", "Next token"]),
                    script: vec![
                        SequencerEvent::phase("Collecting data"),
                        SequencerEvent::reveal(1),
                        SequencerEvent::reveal(2),
                        SequencerEvent::phase("Training"),
                        SequencerEvent::reveal(3),
                        typed("The cat sat on the ..."),
                        SequencerEvent::reveal(4),
                        SequencerEvent::line("prediction: mat (p = 0.62)"),
                    ],
                },
            ),
            stage(
                "rlhf",
                "RLHF",
                "Reinforcement learning from human feedback",
                "Human raters compare pairs of answers. A **reward model** learns their \
                 preferences and the policy is tuned to score well against it.",
                VisualizationKind::StepBuilder {
                    steps: items(&[
                        ("sample", "Sample answers", "The model writes several candidates."),
                        ("rank", "Humans rank them", "Raters pick the better answer."),
                        ("reward", "Train a reward model", "Preferences become a score."),
                        ("tune", "Optimise the policy", "The model is nudged toward high reward."),
                    ]),
                },
            ),
            stage(
                "risks",
                "Failure modes",
                "What can go wrong",
                "Aligned models can still fail. Click each risk to see an example.",
                VisualizationKind::Select {
                    options: items(&[
                        ("hallucination", "Hallucination", "Confident answers with invented facts."),
                        ("jailbreak", "Jailbreaks", "Prompts that talk the model out of its rules."),
                        ("reward-hacking", "Reward hacking", "Scoring well without doing the task."),
                        ("bias", "Bias", "Skewed outputs inherited from training data."),
                    ]),
                },
            ),
            stage(
                "guardrails",
                "Guardrails",
                "Layers of defence",
                "Production systems stack several defences. Tick the ones your own project uses.",
                VisualizationKind::Checklist {
                    items: items(&[
                        ("input-filter", "Input filtering", "Reject disallowed requests early."),
                        ("system-prompt", "System prompt", "State the rules the model must follow."),
                        ("output-check", "Output checks", "Classify answers before showing them."),
                        ("human-review", "Human review", "Escalate high-stakes cases."),
                    ]),
                },
            ),
            stage(
                "red-team",
                "Red teaming",
                "Probe the model yourself",
                "Try to get a refusal, then try to phrase the same request harmlessly.",
                VisualizationKind::TryIt {
                    system: Some("You are a careful assistant that follows safety rules.".to_string()),
                    prompt: "Explain why you would refuse to help pick a lock.".to_string(),
                },
            ),
        ],
        summary: summary(
            "You now know how models are aligned and where that alignment breaks.",
            &[
                "Pretraining teaches prediction, not values.",
                "RLHF turns human preferences into a training signal.",
                "Defence in depth beats any single guardrail.",
            ],
        ),
        quiz: vec![
            question(
                "What does the reward model in RLHF learn?",
                &["Grammar", "Human preferences", "Tokenization", "Model size"],
                1,
            )?,
            question(
                "Which failure mode produces confident but invented facts?",
                &["Jailbreak", "Bias", "Hallucination"],
                2,
            )?,
        ],
        tips: vec![
            tip(0, 1, "Press Replay to watch the animation again."),
            tip(2, 2, "Every option is worth a look before moving on."),
        ],
    })
}

//
// ─── AGENTIC AI ───────────────────────────────────────────────────────────────
//

fn agentic_ai() -> Result<ModuleDraft, Error> {
    Ok(ModuleDraft {
        id: ModuleId::new("agentic-ai")?,
        title: "Agentic AI".to_string(),
        tagline: "Models that plan, call tools and act in loops.".to_string(),
        stages: vec![
            stage(
                "loop",
                "The agent loop",
                "Plan, act, observe",
                "An agent repeats a simple loop: **plan** the next step, **act** with a tool, \
                 then **observe** the result.",
                VisualizationKind::Sequence {
                    nodes: nodes(&["Goal", "Plan", "Act", "Observe"]),
                    script: vec![
                        SequencerEvent::reveal(1),
                        SequencerEvent::phase("Thinking"),
                        SequencerEvent::reveal(2),
                        typed("I should search the docs first."),
                        SequencerEvent::reveal(3),
                        SequencerEvent::line("tool: search(\"rate limits\")"),
                        SequencerEvent::reveal(4),
                        SequencerEvent::line("result: 60 requests per minute"),
                    ],
                },
            ),
            stage(
                "tools",
                "Tools",
                "What an agent can call",
                "Tools are plain functions with a name, a description and typed arguments. \
                 Pick a tool to see its signature.",
                VisualizationKind::Select {
                    options: items(&[
                        ("search", "search(query)", "Returns the top documents for a query."),
                        ("read-file", "read_file(path)", "Returns the contents of a file."),
                        ("run", "run(command)", "Executes a shell command in a sandbox."),
                    ]),
                },
            ),
            stage(
                "order",
                "Ordering",
                "Build a plan",
                "Put the steps of a bug-fixing agent in order.",
                VisualizationKind::StepBuilder {
                    steps: items(&[
                        ("reproduce", "Reproduce the bug", "Run the failing test."),
                        ("locate", "Locate the cause", "Read the code involved."),
                        ("patch", "Write a patch", "Edit the smallest amount of code."),
                        ("verify", "Verify", "Run the tests again."),
                    ]),
                },
            ),
            stage(
                "safety",
                "Staying in bounds",
                "Limits for autonomous agents",
                "Autonomy needs limits. Check every control before you let an agent run alone.",
                VisualizationKind::Checklist {
                    items: items(&[
                        ("budget", "Step budget", "Stop after a fixed number of iterations."),
                        ("sandbox", "Sandbox", "Run tools without access to production."),
                        ("approval", "Approval gates", "Ask a human before destructive actions."),
                    ]),
                },
            ),
            stage(
                "try",
                "Plan something",
                "Ask a model to plan",
                "Ask the model to break a task into tool calls.",
                VisualizationKind::TryIt {
                    system: Some("You plan tasks as numbered tool calls.".to_string()),
                    prompt: "Plan how to find the three largest files in a project.".to_string(),
                },
            ),
        ],
        summary: summary(
            "Agents are loops around a model, with tools and limits.",
            &[
                "Plan, act and observe until the goal is met.",
                "Tools are typed functions the model can request.",
                "Budgets, sandboxes and approvals keep agents safe.",
            ],
        ),
        quiz: vec![
            question(
                "What comes right after an agent acts with a tool?",
                &["It plans", "It observes the result", "It stops"],
                1,
            )?,
            question(
                "Which control stops a runaway agent?",
                &["A larger model", "A step budget", "A longer prompt"],
                1,
            )?,
        ],
        tips: vec![tip(2, 3, "Use Undo to take back the last step you placed.")],
    })
}

//
// ─── LOCAL MODELS ─────────────────────────────────────────────────────────────
//

fn local_models() -> Result<ModuleDraft, Error> {
    Ok(ModuleDraft {
        id: ModuleId::new("ollama")?,
        title: "Local Models with Ollama".to_string(),
        tagline: "Run open models on your own machine.".to_string(),
        stages: vec![
            stage(
                "install",
                "Install",
                "Get the runtime",
                "Ollama ships a single binary and a background server on port `11434`.",
                VisualizationKind::Sequence {
                    nodes: nodes(&["Terminal", "Ollama server"]),
                    script: vec![
                        SequencerEvent::reveal(1),
                        typed("$ ollama serve"),
                        SequencerEvent::reveal(2),
                        SequencerEvent::line("Listening on 127.0.0.1:11434"),
                    ],
                },
            ),
            stage(
                "pull",
                "Pull a model",
                "Download weights",
                "Models are pulled by name and tag, like container images.",
                VisualizationKind::Sequence {
                    nodes: nodes(&["Registry", "Local cache"]),
                    script: vec![
                        typed("$ ollama pull llama3.2:3b"),
                        SequencerEvent::reveal(1),
                        SequencerEvent::phase("Downloading"),
                        SequencerEvent::line("pulling manifest"),
                        SequencerEvent::line("verifying sha256 digest"),
                        SequencerEvent::reveal(2),
                        SequencerEvent::phase("Ready"),
                    ],
                },
            ),
            stage(
                "sizes",
                "Choosing a size",
                "Parameters versus memory",
                "Bigger models answer better but need more memory. Compare the common sizes.",
                VisualizationKind::Select {
                    options: items(&[
                        ("3b", "3B", "Runs on most laptops with 8 GB of RAM."),
                        ("8b", "8B", "Needs around 16 GB; a good default."),
                        ("70b", "70B", "Needs a workstation GPU or lots of RAM."),
                    ]),
                },
            ),
            stage(
                "checklist",
                "Before you ship",
                "Local deployment checklist",
                "Tick each item once your setup covers it.",
                VisualizationKind::Checklist {
                    items: items(&[
                        ("quantized", "Quantized weights", "Use a q4 or q5 build to save memory."),
                        ("context", "Context length", "Set num_ctx to what your prompts need."),
                        ("keep-alive", "Keep-alive", "Keep the model loaded between requests."),
                    ]),
                },
            ),
        ],
        summary: summary(
            "You can now run and size a local model.",
            &[
                "The server exposes an HTTP API on localhost.",
                "Models are pulled by name and tag.",
                "Memory decides which size you can run.",
            ],
        ),
        quiz: vec![question(
            "Which model size is the safest choice on an 8 GB laptop?",
            &["3B", "8B", "70B"],
            0,
        )?],
        tips: vec![tip(1, 4, "The first pull can take a while on slow connections.")],
    })
}

//
// ─── PROMPT ENGINEERING ───────────────────────────────────────────────────────
//

fn prompt_engineering() -> Result<ModuleDraft, Error> {
    Ok(ModuleDraft {
        id: ModuleId::new("prompt-engineering")?,
        title: "Prompt Engineering".to_string(),
        tagline: "Write prompts that get the answer you want.".to_string(),
        stages: vec![
            stage(
                "anatomy",
                "Anatomy of a prompt",
                "Role, task, context, format",
                "A good prompt states a **role**, the **task**, the needed **context** and the \
                 expected **format**.",
                VisualizationKind::Sequence {
                    nodes: nodes(&["Role", "Task", "Context", "Format"]),
                    script: vec![
                        SequencerEvent::reveal(1),
                        typed("You are a senior editor."),
                        SequencerEvent::reveal(2),
                        typed("Shorten this paragraph."),
                        SequencerEvent::reveal(3),
                        SequencerEvent::reveal(4),
                        typed("Reply with one sentence."),
                    ],
                },
            ),
            stage(
                "techniques",
                "Techniques",
                "Common prompting patterns",
                "Pick a technique to see when it helps.",
                VisualizationKind::Select {
                    options: items(&[
                        ("few-shot", "Few-shot", "Show two or three worked examples first."),
                        ("cot", "Step by step", "Ask for reasoning before the answer."),
                        ("delimiters", "Delimiters", "Fence user input with clear markers."),
                    ]),
                },
            ),
            stage(
                "review",
                "Review checklist",
                "Before you send",
                "Check your prompt against each item.",
                VisualizationKind::Checklist {
                    items: items(&[
                        ("specific", "Specific", "The task cannot be read two ways."),
                        ("format", "Format stated", "The output shape is explicit."),
                        ("examples", "Examples", "At least one example if the format is unusual."),
                    ]),
                },
            ),
            stage(
                "sampling",
                "Sampling",
                "Temperature and top-p",
                "Low temperature gives focused answers; high temperature gives variety. \
                 Change the settings and run the same prompt twice.",
                VisualizationKind::TryIt {
                    system: None,
                    prompt: "Suggest a name for a coffee shop run by robots.".to_string(),
                },
            ),
        ],
        summary: summary(
            "Clear structure and the right sampling settings make prompts reliable.",
            &[
                "State role, task, context and format.",
                "Examples beat long explanations.",
                "Temperature trades focus for variety.",
            ],
        ),
        quiz: vec![
            question(
                "Which technique shows the model worked examples?",
                &["Few-shot", "Delimiters", "Low temperature"],
                0,
            )?,
            question(
                "What does raising the temperature do?",
                &["Makes answers shorter", "Adds variety", "Speeds up the model"],
                1,
            )?,
        ],
        tips: vec![tip(3, 5, "Try temperature 0 and 1.5 to feel the difference.")],
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn builtin_modules_validate() {
        let modules = builtin_modules().unwrap();
        assert_eq!(modules.len(), 4);
        for module in &modules {
            assert!(module.stage_count() >= 4, "{} is too short", module.id());
            assert!(!module.quiz().is_empty(), "{} has no quiz", module.id());
        }
    }

    #[test]
    fn ids_and_tip_ids_are_unique() {
        let modules = builtin_modules().unwrap();
        let ids: HashSet<_> = modules.iter().map(|m| m.id().clone()).collect();
        assert_eq!(ids.len(), modules.len());

        let tips: Vec<_> = modules
            .iter()
            .flat_map(|m| (0..m.stage_count()).filter_map(|i| m.tip_for_stage(i).map(|t| t.id)))
            .collect();
        let unique: HashSet<_> = tips.iter().collect();
        assert_eq!(unique.len(), tips.len());
    }

    #[test]
    fn every_visualization_kind_is_used() {
        let modules = builtin_modules().unwrap();
        let kinds: HashSet<_> = modules
            .iter()
            .flat_map(|m| m.stages())
            .map(|stage| std::mem::discriminant(stage.visualization()))
            .collect();
        assert_eq!(kinds.len(), 5);
    }

    #[test]
    fn find_by_id() {
        let id = ModuleId::new("ollama").unwrap();
        assert_eq!(find(&id).unwrap().map(|m| m.stage_count()), Some(4));
        assert!(find(&ModuleId::new("missing").unwrap()).unwrap().is_none());
    }
}
