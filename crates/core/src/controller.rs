//! Module progress controller.
//!
//! One state machine drives every module: `NotStarted | InStage(i) |
//! Finished` plus the session high-water mark. Actions never fail; an action
//! that is not valid in the current state returns no effects and leaves the
//! state untouched. Side effects are returned as [`Effect`] values for the
//! caller to execute.

use std::sync::Arc;
use std::time::Duration;

use crate::model::{LearnTip, Module, ModuleId, ModuleProgress, StagePosition, TipBoard};
use crate::settings::TutorialSettings;

/// Identifies one scheduled fade. Only the most recent token is honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FadeToken(u64);

impl FadeToken {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Write the stage value (`-1..=N`) for this module.
    PersistStage(i64),
    NotifyStarted,
    NotifyCompleted,
    ScrollToTop,
    /// Call [`TutorialController::finish_fade`] with `token` after `after`.
    ScheduleFade { token: FadeToken, after: Duration },
    /// Call [`TutorialController::finish_tip_fade`] with `token` after `after`.
    ScheduleTipFade { token: FadeToken, after: Duration },
    SwitchModule(ModuleId),
}

/// What the module view should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Entry,
    Stage(usize),
    Summary,
    Quiz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepState {
    Current,
    Visited,
    Locked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepperItem {
    pub index: usize,
    pub label: String,
    pub tooltip: String,
    pub state: StepState,
}

impl StepperItem {
    #[must_use]
    pub fn is_clickable(&self) -> bool {
        self.state == StepState::Visited
    }
}

#[derive(Debug, Clone)]
pub struct TutorialController {
    module: Arc<Module>,
    settings: TutorialSettings,
    progress: ModuleProgress,
    tips: TipBoard,
    welcome_visible: bool,
    started_notified: bool,
    fade: Option<FadeToken>,
    tip_fade: Option<FadeToken>,
    next_token: u64,
    quiz_open: bool,
}

impl TutorialController {
    #[must_use]
    pub fn new(module: Arc<Module>, settings: TutorialSettings) -> Self {
        let progress = ModuleProgress::new(module.stage_count());
        Self {
            module,
            settings,
            progress,
            tips: TipBoard::new(),
            welcome_visible: false,
            started_notified: false,
            fade: None,
            tip_fade: None,
            next_token: 0,
            quiz_open: false,
        }
    }

    /// Rebuild a controller from the persisted stage value.
    ///
    /// A module resumed mid-way has already been started, so no further
    /// started notification is emitted for it.
    #[must_use]
    pub fn resume(module: Arc<Module>, settings: TutorialSettings, persisted: Option<i64>) -> Self {
        let mut controller = Self::new(module, settings);
        controller.progress = ModuleProgress::resume(controller.module.stage_count(), persisted);
        controller.started_notified = !matches!(
            controller.progress.current(),
            StagePosition::NotStarted
        );
        if let StagePosition::InStage(index) = controller.progress.current() {
            controller.offer_tip(index);
        }
        controller
    }

    //
    // ─── ACTIONS ──────────────────────────────────────────────────────────────
    //

    /// Begin the module from the entry screen.
    pub fn start(&mut self) -> Vec<Effect> {
        if self.progress.current() != StagePosition::NotStarted {
            return Vec::new();
        }
        self.welcome_visible = true;
        let mut effects = self.enter_stage(0);
        if !self.started_notified {
            self.started_notified = true;
            effects.push(Effect::NotifyStarted);
        }
        effects
    }

    /// Advance one stage, or begin the finishing fade from the last stage.
    pub fn next(&mut self) -> Vec<Effect> {
        if self.fade.is_some() {
            return Vec::new();
        }
        let Some(current) = self.progress.current().stage() else {
            return Vec::new();
        };
        if current + 1 < self.module.stage_count() {
            return self.enter_stage(current + 1);
        }
        let token = self.issue_token();
        self.fade = Some(token);
        vec![Effect::ScheduleFade {
            token,
            after: self.settings.finish_fade,
        }]
    }

    /// Complete the fade started by [`next`](Self::next) on the last stage.
    pub fn finish_fade(&mut self, token: FadeToken) -> Vec<Effect> {
        if self.fade != Some(token) {
            return Vec::new();
        }
        self.fade = None;
        self.progress.observe(StagePosition::Finished);
        vec![
            Effect::PersistStage(self.progress.persisted_value()),
            Effect::NotifyCompleted,
            Effect::ScrollToTop,
        ]
    }

    pub fn back(&mut self) -> Vec<Effect> {
        if self.fade.is_some() {
            return Vec::new();
        }
        match self.progress.current().stage() {
            Some(current) if current > 0 => self.enter_stage(current - 1),
            _ => Vec::new(),
        }
    }

    /// Jump to a stage already reached this session.
    ///
    /// Works from inside a stage and from the final summary.
    pub fn go_to(&mut self, index: usize) -> Vec<Effect> {
        if self.fade.is_some() || self.quiz_open || !self.progress.is_navigable(index) {
            return Vec::new();
        }
        match self.progress.current() {
            StagePosition::InStage(current) if current != index => self.enter_stage(index),
            StagePosition::Finished => self.enter_stage(index),
            _ => Vec::new(),
        }
    }

    pub fn open_quiz(&mut self) -> Vec<Effect> {
        if self.progress.current().is_finished() && !self.module.quiz().is_empty() {
            self.quiz_open = true;
        }
        Vec::new()
    }

    /// Leave the quiz back to the final summary.
    pub fn quiz_back(&mut self) -> Vec<Effect> {
        self.quiz_open = false;
        Vec::new()
    }

    pub fn switch_module(&mut self, id: ModuleId) -> Vec<Effect> {
        self.quiz_open = false;
        vec![Effect::SwitchModule(id)]
    }

    /// Forget all progress and return to the entry screen.
    pub fn start_over(&mut self) -> Vec<Effect> {
        self.progress.reset();
        self.tips.reset();
        self.fade = None;
        self.tip_fade = None;
        self.quiz_open = false;
        self.welcome_visible = false;
        self.started_notified = false;
        vec![Effect::PersistStage(self.progress.persisted_value())]
    }

    /// Dismiss the live tip; it fades out and is never shown again this
    /// session.
    pub fn dismiss_tip(&mut self) -> Vec<Effect> {
        if self.tips.dismiss().is_none() {
            return Vec::new();
        }
        let token = self.issue_token();
        self.tip_fade = Some(token);
        vec![Effect::ScheduleTipFade {
            token,
            after: self.settings.tip_fade,
        }]
    }

    pub fn finish_tip_fade(&mut self, token: FadeToken) -> Vec<Effect> {
        if self.tip_fade != Some(token) {
            return Vec::new();
        }
        self.tip_fade = None;
        self.tips.clear_faded();
        Vec::new()
    }

    pub fn dismiss_welcome(&mut self) -> Vec<Effect> {
        self.welcome_visible = false;
        Vec::new()
    }

    fn enter_stage(&mut self, index: usize) -> Vec<Effect> {
        self.quiz_open = false;
        self.progress.observe(StagePosition::InStage(index));
        if index != 0 {
            self.welcome_visible = false;
        }
        self.offer_tip(index);
        vec![Effect::PersistStage(self.progress.persisted_value())]
    }

    fn offer_tip(&mut self, index: usize) {
        let module = Arc::clone(&self.module);
        self.tips.offer(module.tip_for_stage(index));
    }

    fn issue_token(&mut self) -> FadeToken {
        self.next_token += 1;
        FadeToken(self.next_token)
    }

    //
    // ─── QUERIES ──────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn module(&self) -> &Arc<Module> {
        &self.module
    }

    #[must_use]
    pub fn settings(&self) -> &TutorialSettings {
        &self.settings
    }

    #[must_use]
    pub fn position(&self) -> StagePosition {
        self.progress.current()
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        match self.progress.current() {
            StagePosition::NotStarted => Screen::Entry,
            StagePosition::InStage(index) => Screen::Stage(index),
            StagePosition::Finished if self.quiz_open => Screen::Quiz,
            StagePosition::Finished => Screen::Summary,
        }
    }

    #[must_use]
    pub fn max_reached(&self) -> Option<usize> {
        self.progress.max_reached()
    }

    #[must_use]
    pub fn is_navigable(&self, index: usize) -> bool {
        self.progress.is_navigable(index)
    }

    #[must_use]
    pub fn stepper(&self) -> Vec<StepperItem> {
        let current = self.progress.current().stage();
        self.module
            .stages()
            .iter()
            .map(|stage| {
                let index = stage.index();
                let state = if current == Some(index) {
                    StepState::Current
                } else if self.progress.is_navigable(index) {
                    StepState::Visited
                } else {
                    StepState::Locked
                };
                StepperItem {
                    index,
                    label: stage.label().to_string(),
                    tooltip: stage.tooltip().to_string(),
                    state,
                }
            })
            .collect()
    }

    #[must_use]
    pub fn live_tip(&self) -> Option<&LearnTip> {
        self.tips.live()
    }

    #[must_use]
    pub fn tip_is_fading(&self) -> bool {
        self.tips.is_fading()
    }

    #[must_use]
    pub fn welcome_visible(&self) -> bool {
        self.welcome_visible
    }

    #[must_use]
    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    #[must_use]
    pub fn quiz_open(&self) -> bool {
        self.quiz_open
    }

    #[must_use]
    pub fn is_last_stage(&self) -> bool {
        self.progress.current().stage() == self.module.stage_count().checked_sub(1)
    }

    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        self.progress.percent()
    }
}
