mod completion;
mod ids;
mod module;
mod progress;
mod quiz;
mod tip;

pub use completion::{ChatMessage, ChatRole, CompletionRequest, SamplingSettings};
pub use ids::{ModuleId, NodeId, OverlayId, ParseIdError, TipId};
pub use module::{
    ChoiceItem, DiagramNode, Module, ModuleDraft, ModuleError, Stage, StageDraft,
    SummaryContent, VisualizationKind,
};
pub use progress::{ModuleProgress, NOT_STARTED, StagePosition};
pub use quiz::{QuizError, QuizQuestion, QuizResult, QuizSession};
pub use tip::{LearnTip, TipBoard};
