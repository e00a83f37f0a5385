//! Local state for the interactive widget embedded in each stage.
//!
//! The widgets share one contract: they receive an `active` flag from the
//! module view, auto-playing widgets start their sequencer once per
//! activation, and everything scheduled is torn down when they deactivate.

use std::collections::HashSet;
use std::hash::Hash;
use std::time::Duration;

use crate::model::{ChatMessage, CompletionRequest, SamplingSettings};
use crate::sequencer::{Sequencer, SequencerEvent, SequencerHandle, SequencerView};
use crate::settings::TutorialSettings;

//
// ─── AUTO-PLAY ────────────────────────────────────────────────────────────────
//

/// Sequencer bound to a stage's `active` flag.
#[derive(Debug, Clone)]
pub struct StagePlayer {
    sequencer: Sequencer,
    script: Vec<SequencerEvent>,
    step_delay: Duration,
    active: bool,
}

impl StagePlayer {
    /// Typed text in `script` is retimed to `settings.char_delay`.
    #[must_use]
    pub fn new(script: Vec<SequencerEvent>, settings: &TutorialSettings) -> Self {
        let char_delay = settings.char_delay;
        let script = script
            .into_iter()
            .map(|event| match event {
                SequencerEvent::TypeText { text, .. } => SequencerEvent::TypeText { text, char_delay },
                other => other,
            })
            .collect();
        Self {
            sequencer: Sequencer::new(),
            script,
            step_delay: settings.step_delay,
            active: false,
        }
    }

    /// Feed the parent's `active` flag.
    ///
    /// Starts the script on a false→true edge only, so repeated `true`
    /// values from unrelated re-renders never restart it. A true→false edge
    /// cancels and clears the view. Returns the handle of a freshly started
    /// run.
    pub fn set_active(&mut self, active: bool, now: Duration) -> Option<SequencerHandle> {
        match (self.active, active) {
            (false, true) => {
                self.active = true;
                Some(self.sequencer.start(&self.script, self.step_delay, now))
            }
            (true, false) => {
                self.active = false;
                self.sequencer.reset();
                None
            }
            _ => None,
        }
    }

    /// Cancel the current run and play the script again from an empty view.
    pub fn replay(&mut self, now: Duration) -> Option<SequencerHandle> {
        if !self.active {
            return None;
        }
        Some(self.sequencer.start(&self.script, self.step_delay, now))
    }

    pub fn poll(&mut self, handle: SequencerHandle, now: Duration) -> usize {
        self.sequencer.poll_with(handle, now)
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.sequencer.next_deadline()
    }

    #[must_use]
    pub fn view(&self) -> &SequencerView {
        self.sequencer.view()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.sequencer.is_running()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.sequencer.is_finished()
    }

    #[must_use]
    pub fn handle(&self) -> SequencerHandle {
        self.sequencer.handle()
    }
}

//
// ─── CHECKLIST ────────────────────────────────────────────────────────────────
//

/// Multi-select checklist with a monotonically growing visited set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checklist<K: Eq + Hash + Clone> {
    items: Vec<K>,
    checked: HashSet<K>,
    visited: HashSet<K>,
}

impl<K: Eq + Hash + Clone> Checklist<K> {
    #[must_use]
    pub fn new(items: Vec<K>) -> Self {
        Self {
            items,
            checked: HashSet::new(),
            visited: HashSet::new(),
        }
    }

    /// Flip `item`. Toggling twice leaves it unchecked again, but it stays
    /// visited. Unknown items are ignored. Returns the new checked state.
    pub fn toggle(&mut self, item: &K) -> bool {
        if !self.items.contains(item) {
            return false;
        }
        self.visited.insert(item.clone());
        if self.checked.remove(item) {
            false
        } else {
            self.checked.insert(item.clone());
            true
        }
    }

    /// Mark `item` as seen without checking it.
    pub fn visit(&mut self, item: &K) {
        if self.items.contains(item) {
            self.visited.insert(item.clone());
        }
    }

    #[must_use]
    pub fn is_checked(&self, item: &K) -> bool {
        self.checked.contains(item)
    }

    #[must_use]
    pub fn is_visited(&self, item: &K) -> bool {
        self.visited.contains(item)
    }

    #[must_use]
    pub fn checked_count(&self) -> usize {
        self.checked.len()
    }

    #[must_use]
    pub fn all_checked(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|item| self.checked.contains(item))
    }

    #[must_use]
    pub fn all_visited(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|item| self.visited.contains(item))
    }

    #[must_use]
    pub fn items(&self) -> &[K] {
        &self.items
    }

    /// The only operation that shrinks the visited set.
    pub fn reset(&mut self) {
        self.checked.clear();
        self.visited.clear();
    }
}

//
// ─── SINGLE SELECT ────────────────────────────────────────────────────────────
//

/// Selection grid where at most one option is open at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleSelect<K: Eq + Hash + Clone> {
    options: Vec<K>,
    selected: Option<K>,
    visited: HashSet<K>,
}

impl<K: Eq + Hash + Clone> SingleSelect<K> {
    #[must_use]
    pub fn new(options: Vec<K>) -> Self {
        Self {
            options,
            selected: None,
            visited: HashSet::new(),
        }
    }

    /// Select `option`, or deselect it if it is already selected.
    pub fn select(&mut self, option: &K) {
        if !self.options.contains(option) {
            return;
        }
        self.visited.insert(option.clone());
        if self.selected.as_ref() == Some(option) {
            self.selected = None;
        } else {
            self.selected = Some(option.clone());
        }
    }

    #[must_use]
    pub fn selected(&self) -> Option<&K> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn is_visited(&self, option: &K) -> bool {
        self.visited.contains(option)
    }

    #[must_use]
    pub fn all_visited(&self) -> bool {
        !self.options.is_empty() && self.options.iter().all(|option| self.visited.contains(option))
    }

    #[must_use]
    pub fn options(&self) -> &[K] {
        &self.options
    }

    pub fn reset(&mut self) {
        self.selected = None;
        self.visited.clear();
    }
}

//
// ─── STEP BUILDER ─────────────────────────────────────────────────────────────
//

/// Learner assembles an ordered sequence out of a pool of steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepBuilder<K: Eq + Clone> {
    expected: Vec<K>,
    chosen: Vec<K>,
}

impl<K: Eq + Clone> StepBuilder<K> {
    #[must_use]
    pub fn new(expected: Vec<K>) -> Self {
        Self {
            expected,
            chosen: Vec::new(),
        }
    }

    /// Append `step` unless it was already chosen or is unknown.
    pub fn push(&mut self, step: &K) -> bool {
        if !self.expected.contains(step) || self.chosen.contains(step) {
            return false;
        }
        self.chosen.push(step.clone());
        true
    }

    pub fn pop(&mut self) -> Option<K> {
        self.chosen.pop()
    }

    #[must_use]
    pub fn chosen(&self) -> &[K] {
        &self.chosen
    }

    #[must_use]
    pub fn is_chosen(&self, step: &K) -> bool {
        self.chosen.contains(step)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.chosen.len() == self.expected.len()
    }

    /// Every step placed, in the expected order.
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.chosen == self.expected
    }

    /// Length of the correct prefix built so far.
    #[must_use]
    pub fn correct_prefix(&self) -> usize {
        self.chosen
            .iter()
            .zip(&self.expected)
            .take_while(|(chosen, expected)| chosen == expected)
            .count()
    }

    pub fn reset(&mut self) {
        self.chosen.clear();
    }
}

//
// ─── TRY-IT PANEL ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Succeeded(String),
    Failed(String),
}

/// Editable prompt submitted to the completion collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct TryItPanel {
    system: Option<String>,
    prompt: String,
    sampling: SamplingSettings,
    state: RunState,
}

impl TryItPanel {
    #[must_use]
    pub fn new(system: Option<String>, prompt: impl Into<String>, sampling: SamplingSettings) -> Self {
        Self {
            system,
            prompt: prompt.into(),
            sampling,
            state: RunState::Idle,
        }
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn sampling_mut(&mut self) -> &mut SamplingSettings {
        &mut self.sampling
    }

    #[must_use]
    pub fn sampling(&self) -> &SamplingSettings {
        &self.sampling
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn state(&self) -> &RunState {
        &self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// The run control is enabled.
    #[must_use]
    pub fn can_run(&self) -> bool {
        !self.is_running() && !self.prompt.trim().is_empty()
    }

    /// Enter the running state and build the request.
    ///
    /// Returns `None` while a request is already in flight (single-flight)
    /// or when the prompt is blank.
    pub fn begin_run(&mut self) -> Option<CompletionRequest> {
        if !self.can_run() {
            return None;
        }
        self.state = RunState::Running;
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = self.system.as_ref().filter(|s| !s.trim().is_empty()) {
            messages.push(ChatMessage::system(system.clone()));
        }
        messages.push(ChatMessage::user(self.prompt.clone()));
        Some(CompletionRequest::new(&self.sampling, messages))
    }

    /// Store the collaborator's answer or its error message verbatim.
    pub fn finish(&mut self, outcome: Result<String, String>) {
        if !self.is_running() {
            return;
        }
        self.state = match outcome {
            Ok(text) => RunState::Succeeded(text),
            Err(message) => RunState::Failed(message),
        };
    }

    pub fn reset(&mut self) {
        self.state = RunState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn player() -> StagePlayer {
        let settings = TutorialSettings {
            step_delay: ms(100),
            ..TutorialSettings::default()
        };
        StagePlayer::new(
            vec![SequencerEvent::reveal(1), SequencerEvent::reveal(2)],
            &settings,
        )
    }

    #[test]
    fn typing_follows_settings_char_delay() {
        let settings = TutorialSettings {
            step_delay: ms(100),
            char_delay: ms(10),
            ..TutorialSettings::default()
        };
        let mut player = StagePlayer::new(
            vec![SequencerEvent::type_text("abc", ms(500))],
            &settings,
        );
        let handle = player.set_active(true, ms(0)).unwrap();
        player.poll(handle, ms(20));
        assert!(player.is_finished());
        assert_eq!(player.view().typed, vec!["abc".to_string()]);
    }

    #[test]
    fn instant_settings_play_every_builtin_script_at_once() {
        let settings = TutorialSettings::instant();
        for module in crate::catalog::builtin_modules().unwrap() {
            for stage in module.stages() {
                let crate::model::VisualizationKind::Sequence { script, .. } = stage.visualization()
                else {
                    continue;
                };
                let mut player = StagePlayer::new(script.clone(), &settings);
                player.set_active(true, ms(0)).unwrap();
                assert!(player.is_finished(), "{} / {} still animating", module.id(), stage.key());
                assert_eq!(player.next_deadline(), None);
            }
        }
    }

    #[test]
    fn player_starts_once_per_activation() {
        let mut player = player();
        let handle = player.set_active(true, ms(0)).unwrap();
        assert!(player.set_active(true, ms(50)).is_none());
        assert_eq!(player.handle(), handle);
        player.poll(handle, ms(100));
        assert_eq!(player.view().revealed.len(), 1);
    }

    #[test]
    fn deactivation_cancels_and_clears() {
        let mut player = player();
        let handle = player.set_active(true, ms(0)).unwrap();
        player.poll(handle, ms(100));
        player.set_active(false, ms(150));
        assert!(!player.is_active());
        assert!(player.view().is_empty());
        assert_eq!(player.poll(handle, ms(5_000)), 0);
        assert!(player.view().is_empty());
    }

    #[test]
    fn reactivation_starts_clean() {
        let mut player = player();
        let first = player.set_active(true, ms(0)).unwrap();
        player.poll(first, ms(1_000));
        player.set_active(false, ms(1_000));
        let second = player.set_active(true, ms(2_000)).unwrap();
        assert!(player.view().is_empty());
        player.poll(second, ms(2_200));
        assert_eq!(player.view().revealed.len(), 2);
    }

    #[test]
    fn replay_only_while_active() {
        let mut player = player();
        assert!(player.replay(ms(0)).is_none());
        player.set_active(true, ms(0));
        assert!(player.replay(ms(10)).is_some());
    }

    #[test]
    fn checklist_toggle_twice_returns_to_unchecked() {
        let mut list = Checklist::new(vec!["A", "B", "C"]);
        assert!(list.toggle(&"A"));
        assert!(!list.toggle(&"A"));
        assert_eq!(list.checked_count(), 0);
        assert!(!list.all_checked());
        assert!(list.is_visited(&"A"));
    }

    #[test]
    fn checklist_all_checked() {
        let mut list = Checklist::new(vec!["A", "B"]);
        list.toggle(&"A");
        list.toggle(&"B");
        assert!(list.all_checked());
        assert!(list.all_visited());
        assert!(!list.toggle(&"Z"));
    }

    #[test]
    fn visited_only_shrinks_on_reset() {
        let mut list = Checklist::new(vec!["A", "B"]);
        list.visit(&"A");
        list.toggle(&"B");
        list.toggle(&"B");
        assert!(list.all_visited());
        list.reset();
        assert!(!list.is_visited(&"A"));
    }

    #[test]
    fn single_select_reselect_deselects() {
        let mut grid = SingleSelect::new(vec![1, 2, 3]);
        grid.select(&2);
        assert_eq!(grid.selected(), Some(&2));
        grid.select(&2);
        assert_eq!(grid.selected(), None);
        grid.select(&1);
        grid.select(&3);
        assert_eq!(grid.selected(), Some(&3));
        assert!(grid.all_visited());
    }

    #[test]
    fn step_builder_tracks_order() {
        let mut builder = StepBuilder::new(vec!["plan", "act", "observe"]);
        assert!(builder.push(&"plan"));
        assert!(!builder.push(&"plan"));
        builder.push(&"observe");
        assert_eq!(builder.correct_prefix(), 1);
        builder.pop();
        builder.push(&"act");
        builder.push(&"observe");
        assert!(builder.is_complete());
        assert!(builder.is_correct());
    }

    #[test]
    fn try_it_is_single_flight() {
        let mut panel = TryItPanel::new(None, "Say hi", SamplingSettings::default());
        assert!(panel.begin_run().is_some());
        assert!(panel.begin_run().is_none());
        assert!(!panel.can_run());
        panel.finish(Ok("hi".into()));
        assert_eq!(panel.state(), &RunState::Succeeded("hi".into()));
        assert!(panel.can_run());
    }

    #[test]
    fn try_it_failure_keeps_message_and_reenables() {
        let mut panel = TryItPanel::new(None, "Say hi", SamplingSettings::default());
        panel.begin_run();
        panel.finish(Err("rate limited".into()));
        assert_eq!(panel.state(), &RunState::Failed("rate limited".into()));
        assert!(panel.can_run());
    }

    #[test]
    fn try_it_includes_system_message() {
        let mut panel = TryItPanel::new(
            Some("You are terse.".into()),
            "Explain RLHF",
            SamplingSettings::default(),
        );
        let request = panel.begin_run().unwrap();
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[1].content, "Explain RLHF");
    }

    #[test]
    fn blank_prompt_cannot_run() {
        let mut panel = TryItPanel::new(None, "   ", SamplingSettings::default());
        assert!(panel.begin_run().is_none());
        assert_eq!(panel.state(), &RunState::Idle);
    }
}
