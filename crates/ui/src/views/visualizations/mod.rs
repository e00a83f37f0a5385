mod checklist;
mod select;
mod sequence;
mod step_builder;
mod try_it;

use dioxus::prelude::*;
use tutor_core::model::VisualizationKind;

use checklist::ChecklistViz;
use select::SelectViz;
use sequence::SequenceViz;
use step_builder::StepBuilderViz;
use try_it::TryItViz;

/// Interactive widget embedded in a stage frame.
///
/// Callers key this component by stage so local widget state resets when the
/// learner moves between stages.
#[component]
pub fn StageVisualization(kind: VisualizationKind, active: bool) -> Element {
    match kind {
        VisualizationKind::Sequence { nodes, script } => rsx! {
            SequenceViz { nodes, script, active }
        },
        VisualizationKind::Checklist { items } => rsx! {
            ChecklistViz { items }
        },
        VisualizationKind::Select { options } => rsx! {
            SelectViz { options }
        },
        VisualizationKind::StepBuilder { steps } => rsx! {
            StepBuilderViz { steps }
        },
        VisualizationKind::TryIt { system, prompt } => rsx! {
            TryItViz { system, prompt }
        },
    }
}
