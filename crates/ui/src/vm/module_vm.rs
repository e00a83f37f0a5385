use services::ModuleStatus;
use tutor_core::model::ModuleId;
use tutor_core::{Effect, FadeToken, TutorialController};

/// Learner intent dispatched by the module view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TutorialAction {
    Start,
    Next,
    Back,
    GoTo(usize),
    FinishFade(FadeToken),
    OpenQuiz,
    QuizBack,
    StartOver,
    SwitchModule(ModuleId),
    DismissTip,
    FinishTipFade(FadeToken),
    DismissWelcome,
}

/// Route an action to the controller and return the effects it produced.
pub fn apply_action(controller: &mut TutorialController, action: TutorialAction) -> Vec<Effect> {
    match action {
        TutorialAction::Start => controller.start(),
        TutorialAction::Next => controller.next(),
        TutorialAction::Back => controller.back(),
        TutorialAction::GoTo(index) => controller.go_to(index),
        TutorialAction::FinishFade(token) => controller.finish_fade(token),
        TutorialAction::OpenQuiz => controller.open_quiz(),
        TutorialAction::QuizBack => controller.quiz_back(),
        TutorialAction::StartOver => controller.start_over(),
        TutorialAction::SwitchModule(id) => controller.switch_module(id),
        TutorialAction::DismissTip => controller.dismiss_tip(),
        TutorialAction::FinishTipFade(token) => controller.finish_tip_fade(token),
        TutorialAction::DismissWelcome => controller.dismiss_welcome(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusBadgeVm {
    pub label: String,
    pub class: &'static str,
}

#[must_use]
pub fn status_badge(status: ModuleStatus) -> StatusBadgeVm {
    match status {
        ModuleStatus::NotStarted => StatusBadgeVm {
            label: "Not started".to_string(),
            class: "badge badge-idle",
        },
        ModuleStatus::InProgress { stage, of } => StatusBadgeVm {
            label: format!("Stage {stage} of {of}"),
            class: "badge badge-progress",
        },
        ModuleStatus::Completed => StatusBadgeVm {
            label: "Completed".to_string(),
            class: "badge badge-done",
        },
    }
}

/// Call-to-action label for a module card.
#[must_use]
pub fn status_cta(status: ModuleStatus) -> &'static str {
    match status {
        ModuleStatus::NotStarted => "Start",
        ModuleStatus::InProgress { .. } => "Continue",
        ModuleStatus::Completed => "Review",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tutor_core::model::StagePosition;
    use tutor_core::{Screen, TutorialSettings, catalog};

    fn controller() -> TutorialController {
        let module = catalog::builtin_modules().unwrap().remove(0);
        TutorialController::new(Arc::new(module), TutorialSettings::instant())
    }

    #[test]
    fn actions_route_to_controller() {
        let mut controller = controller();
        let effects = apply_action(&mut controller, TutorialAction::Start);
        assert!(effects.contains(&Effect::NotifyStarted));
        assert_eq!(controller.position(), StagePosition::InStage(0));

        apply_action(&mut controller, TutorialAction::Next);
        apply_action(&mut controller, TutorialAction::GoTo(0));
        assert_eq!(controller.position(), StagePosition::InStage(0));
        assert_eq!(controller.max_reached(), Some(1));
    }

    #[test]
    fn finishing_through_actions_reaches_summary() {
        let mut controller = controller();
        apply_action(&mut controller, TutorialAction::Start);
        let last = controller.module().stage_count() - 1;
        for _ in 0..last {
            apply_action(&mut controller, TutorialAction::Next);
        }
        let effects = apply_action(&mut controller, TutorialAction::Next);
        let Some(Effect::ScheduleFade { token, .. }) = effects.into_iter().next() else {
            panic!("expected a scheduled fade");
        };
        apply_action(&mut controller, TutorialAction::FinishFade(token));
        assert_eq!(controller.screen(), Screen::Summary);
    }

    #[test]
    fn badges_describe_status() {
        assert_eq!(status_badge(ModuleStatus::NotStarted).label, "Not started");
        assert_eq!(
            status_badge(ModuleStatus::InProgress { stage: 2, of: 5 }).label,
            "Stage 2 of 5"
        );
        assert_eq!(status_badge(ModuleStatus::Completed).class, "badge badge-done");
        assert_eq!(status_cta(ModuleStatus::InProgress { stage: 1, of: 4 }), "Continue");
    }
}
