use std::collections::HashSet;

use thiserror::Error;

use crate::model::ids::{ModuleId, NodeId, TipId};
use crate::model::quiz::QuizQuestion;
use crate::model::tip::LearnTip;
use crate::sequencer::SequencerEvent;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModuleError {
    #[error("module title cannot be empty")]
    EmptyTitle,
    #[error("module must contain at least one stage")]
    NoStages,
    #[error("duplicate stage key: {0}")]
    DuplicateStageKey(String),
    #[error("stage {index} has an empty label")]
    EmptyStageLabel { index: usize },
    #[error("tip {tip} targets stage {stage}, but the module has {stage_count} stages")]
    TipOutOfRange {
        tip: TipId,
        stage: usize,
        stage_count: usize,
    },
    #[error("more than one tip maps to stage {0}")]
    DuplicateTipStage(usize),
    #[error("stage {index} visualization has no items")]
    EmptyVisualization { index: usize },
}

//
// ─── STAGE CONTENT ────────────────────────────────────────────────────────────
//

/// A selectable item inside a checklist, selection grid or step builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceItem {
    pub key: String,
    pub label: String,
    pub detail: String,
}

impl ChoiceItem {
    #[must_use]
    pub fn new(key: impl Into<String>, label: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            detail: detail.into(),
        }
    }
}

/// A labelled node in an animated diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramNode {
    pub id: NodeId,
    pub label: String,
}

impl DiagramNode {
    #[must_use]
    pub fn new(id: u32, label: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(id),
            label: label.into(),
        }
    }
}

/// Which interactive widget a stage embeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisualizationKind {
    /// Auto-playing diagram driven by a sequencer script.
    Sequence {
        nodes: Vec<DiagramNode>,
        script: Vec<SequencerEvent>,
    },
    /// Items the learner ticks off; complete once every item is checked.
    Checklist { items: Vec<ChoiceItem> },
    /// One-at-a-time selection grid; complete once every option was viewed.
    Select { options: Vec<ChoiceItem> },
    /// Learner rebuilds `steps` in their listed order.
    StepBuilder { steps: Vec<ChoiceItem> },
    /// Editable prompt sent to the text-completion collaborator.
    TryIt {
        system: Option<String>,
        prompt: String,
    },
}

impl VisualizationKind {
    fn is_empty(&self) -> bool {
        match self {
            Self::Sequence { script, .. } => script.is_empty(),
            Self::Checklist { items } => items.is_empty(),
            Self::Select { options } => options.is_empty(),
            Self::StepBuilder { steps } => steps.is_empty(),
            Self::TryIt { .. } => false,
        }
    }
}

/// Input for one stage; indices are assigned by [`Module::from_draft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageDraft {
    pub key: String,
    pub label: String,
    pub tooltip: String,
    pub explanation: String,
    pub visualization: VisualizationKind,
}

/// One step of a module's linear walkthrough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    index: usize,
    key: String,
    label: String,
    tooltip: String,
    explanation: String,
    visualization: VisualizationKind,
}

impl Stage {
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn tooltip(&self) -> &str {
        &self.tooltip
    }

    /// Markdown explanation shown beside the visualization.
    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn visualization(&self) -> &VisualizationKind {
        &self.visualization
    }
}

/// Content of the final summary screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryContent {
    pub headline: String,
    pub takeaways: Vec<String>,
}

//
// ─── MODULE ───────────────────────────────────────────────────────────────────
//

/// Unvalidated module content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDraft {
    pub id: ModuleId,
    pub title: String,
    pub tagline: String,
    pub stages: Vec<StageDraft>,
    pub summary: SummaryContent,
    pub quiz: Vec<QuizQuestion>,
    /// `(stage index, tip)` pairs; at most one tip per stage.
    pub tips: Vec<(usize, LearnTip)>,
}

/// A complete, immutable tutorial unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    id: ModuleId,
    title: String,
    tagline: String,
    stages: Vec<Stage>,
    summary: SummaryContent,
    quiz: Vec<QuizQuestion>,
    tips: Vec<(usize, LearnTip)>,
}

impl Module {
    /// Validate a draft into a module.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError` if the module has no title or stages, stage keys
    /// repeat, a visualization is empty, or a tip targets a missing stage.
    pub fn from_draft(draft: ModuleDraft) -> Result<Self, ModuleError> {
        if draft.title.trim().is_empty() {
            return Err(ModuleError::EmptyTitle);
        }
        if draft.stages.is_empty() {
            return Err(ModuleError::NoStages);
        }

        let mut keys = HashSet::new();
        let mut stages = Vec::with_capacity(draft.stages.len());
        for (index, stage) in draft.stages.into_iter().enumerate() {
            if !keys.insert(stage.key.clone()) {
                return Err(ModuleError::DuplicateStageKey(stage.key));
            }
            if stage.label.trim().is_empty() {
                return Err(ModuleError::EmptyStageLabel { index });
            }
            if stage.visualization.is_empty() {
                return Err(ModuleError::EmptyVisualization { index });
            }
            stages.push(Stage {
                index,
                key: stage.key,
                label: stage.label,
                tooltip: stage.tooltip,
                explanation: stage.explanation,
                visualization: stage.visualization,
            });
        }

        let mut tip_stages = HashSet::new();
        for (stage, tip) in &draft.tips {
            if *stage >= stages.len() {
                return Err(ModuleError::TipOutOfRange {
                    tip: tip.id,
                    stage: *stage,
                    stage_count: stages.len(),
                });
            }
            if !tip_stages.insert(*stage) {
                return Err(ModuleError::DuplicateTipStage(*stage));
            }
        }

        Ok(Self {
            id: draft.id,
            title: draft.title,
            tagline: draft.tagline,
            stages,
            summary: draft.summary,
            quiz: draft.quiz,
            tips: draft.tips,
        })
    }

    #[must_use]
    pub fn id(&self) -> &ModuleId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn tagline(&self) -> &str {
        &self.tagline
    }

    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    #[must_use]
    pub fn stage(&self, index: usize) -> Option<&Stage> {
        self.stages.get(index)
    }

    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    #[must_use]
    pub fn summary(&self) -> &SummaryContent {
        &self.summary
    }

    #[must_use]
    pub fn quiz(&self) -> &[QuizQuestion] {
        &self.quiz
    }

    /// The tip mapped to `stage`, if any.
    #[must_use]
    pub fn tip_for_stage(&self, stage: usize) -> Option<&LearnTip> {
        self.tips
            .iter()
            .find(|(index, _)| *index == stage)
            .map(|(_, tip)| tip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(key: &str) -> StageDraft {
        StageDraft {
            key: key.to_string(),
            label: format!("Stage {key}"),
            tooltip: String::new(),
            explanation: String::new(),
            visualization: VisualizationKind::Checklist {
                items: vec![ChoiceItem::new("a", "A", "")],
            },
        }
    }

    fn draft(stages: Vec<StageDraft>) -> ModuleDraft {
        ModuleDraft {
            id: ModuleId::new("test").unwrap(),
            title: "Test".to_string(),
            tagline: String::new(),
            stages,
            summary: SummaryContent::default(),
            quiz: Vec::new(),
            tips: Vec::new(),
        }
    }

    #[test]
    fn assigns_stage_indices() {
        let module = Module::from_draft(draft(vec![stage("a"), stage("b")])).unwrap();
        assert_eq!(module.stage_count(), 2);
        assert_eq!(module.stage(1).map(Stage::index), Some(1));
        assert_eq!(module.stage(1).map(Stage::key), Some("b"));
    }

    #[test]
    fn rejects_empty_and_duplicate_stages() {
        assert_eq!(Module::from_draft(draft(Vec::new())), Err(ModuleError::NoStages));
        assert_eq!(
            Module::from_draft(draft(vec![stage("a"), stage("a")])),
            Err(ModuleError::DuplicateStageKey("a".to_string()))
        );
    }

    #[test]
    fn rejects_empty_visualization() {
        let mut empty = stage("a");
        empty.visualization = VisualizationKind::Select {
            options: Vec::new(),
        };
        assert_eq!(
            Module::from_draft(draft(vec![empty])),
            Err(ModuleError::EmptyVisualization { index: 0 })
        );
    }

    #[test]
    fn validates_tip_mapping() {
        let mut bad = draft(vec![stage("a")]);
        bad.tips = vec![(3, LearnTip::new(TipId::new(1), "x"))];
        assert!(matches!(
            Module::from_draft(bad),
            Err(ModuleError::TipOutOfRange { stage: 3, .. })
        ));

        let mut good = draft(vec![stage("a"), stage("b")]);
        good.tips = vec![(1, LearnTip::new(TipId::new(9), "hint"))];
        let module = Module::from_draft(good).unwrap();
        assert_eq!(module.tip_for_stage(1).map(|tip| tip.id), Some(TipId::new(9)));
        assert!(module.tip_for_stage(0).is_none());
    }
}
