//! Deterministic timeline for reveal/type/transition animations.
//!
//! A [`Sequencer`] owns one script run at a time. Time is supplied by the
//! caller as a `Duration` since an arbitrary origin, which keeps the
//! timeline testable with a fake clock and lets the UI drive it from any
//! timer source.
//!
//! Every run is stamped with a generation. `start` and `cancel` bump the
//! generation, so a timer task holding a [`SequencerHandle`] from an older
//! run can never mutate the current view.

use std::time::Duration;

use crate::model::NodeId;

//
// ─── EVENTS ───────────────────────────────────────────────────────────────────
//

/// One scripted UI event, consumed strictly in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerEvent {
    /// Reveal a diagram node.
    RevealNode(NodeId),
    /// Type `text` one character at a time, `char_delay` apart.
    TypeText { text: String, char_delay: Duration },
    /// Switch the named phase shown by the visualization.
    SetPhase(String),
    /// Append a complete line (log output, chat turn, ...).
    InsertLine(String),
}

impl SequencerEvent {
    #[must_use]
    pub fn reveal(id: u32) -> Self {
        Self::RevealNode(NodeId::new(id))
    }

    #[must_use]
    pub fn type_text(text: impl Into<String>, char_delay: Duration) -> Self {
        Self::TypeText {
            text: text.into(),
            char_delay,
        }
    }

    #[must_use]
    pub fn phase(name: impl Into<String>) -> Self {
        Self::SetPhase(name.into())
    }

    #[must_use]
    pub fn line(content: impl Into<String>) -> Self {
        Self::InsertLine(content.into())
    }
}

//
// ─── VIEW ─────────────────────────────────────────────────────────────────────
//

/// Everything a visualization renders from a sequencer run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequencerView {
    pub revealed: Vec<NodeId>,
    pub lines: Vec<String>,
    /// One entry per `TypeText` event that has started typing.
    pub typed: Vec<String>,
    pub phase: Option<String>,
}

impl SequencerView {
    #[must_use]
    pub fn is_revealed(&self, id: NodeId) -> bool {
        self.revealed.contains(&id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.revealed.is_empty()
            && self.lines.is_empty()
            && self.typed.is_empty()
            && self.phase.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Running,
    Done,
}

/// Token identifying one run of a [`Sequencer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SequencerHandle {
    generation: u64,
}

impl SequencerHandle {
    #[must_use]
    pub fn is_current(&self, sequencer: &Sequencer) -> bool {
        sequencer.generation == self.generation && sequencer.state == SequencerState::Running
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Reveal(NodeId),
    BeginTyping,
    TypeChar(char),
    Phase(String),
    Line(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ScheduledStep {
    at: Duration,
    step: Step,
}

//
// ─── SEQUENCER ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
pub struct Sequencer {
    generation: u64,
    state: SequencerState,
    started_at: Duration,
    steps: Vec<ScheduledStep>,
    cursor: usize,
    view: SequencerView,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sequencer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            generation: 0,
            state: SequencerState::Idle,
            started_at: Duration::ZERO,
            steps: Vec::new(),
            cursor: 0,
            view: SequencerView::default(),
        }
    }

    /// Cancel any running script, clear the view and schedule `events`.
    ///
    /// Non-typing events fire `base_delay` after the previous event. A typing
    /// event begins right after the previous event and schedules one step per
    /// character at `char_index * char_delay`.
    pub fn start(
        &mut self,
        events: &[SequencerEvent],
        base_delay: Duration,
        now: Duration,
    ) -> SequencerHandle {
        self.cancel();
        self.view = SequencerView::default();
        self.steps = schedule(events, base_delay);
        self.started_at = now;
        self.state = SequencerState::Running;
        // Zero-delay steps are applied immediately.
        self.poll(now);
        self.handle()
    }

    /// Invalidate every pending step. Safe to call repeatedly.
    ///
    /// The view keeps whatever was revealed before cancellation; call
    /// [`Sequencer::reset`] to clear it as well.
    pub fn cancel(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.steps.clear();
        self.cursor = 0;
        if self.state == SequencerState::Running {
            self.state = SequencerState::Idle;
        }
    }

    /// Cancel and return to the initial empty view.
    pub fn reset(&mut self) {
        self.cancel();
        self.state = SequencerState::Idle;
        self.view = SequencerView::default();
    }

    /// Apply every step due at `now`, in schedule order.
    ///
    /// Returns the number of steps applied.
    pub fn poll(&mut self, now: Duration) -> usize {
        if self.state != SequencerState::Running {
            return 0;
        }
        let elapsed = now.saturating_sub(self.started_at);
        let mut fired = 0;
        while let Some(scheduled) = self.steps.get(self.cursor) {
            if scheduled.at > elapsed {
                break;
            }
            let step = scheduled.step.clone();
            self.apply(step);
            self.cursor += 1;
            fired += 1;
        }
        if self.cursor >= self.steps.len() {
            self.state = SequencerState::Done;
        }
        fired
    }

    /// Poll only if `handle` still identifies the current run.
    pub fn poll_with(&mut self, handle: SequencerHandle, now: Duration) -> usize {
        if !handle.is_current(self) {
            return 0;
        }
        self.poll(now)
    }

    /// Absolute time of the next pending step.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        if self.state != SequencerState::Running {
            return None;
        }
        self.steps
            .get(self.cursor)
            .map(|scheduled| self.started_at + scheduled.at)
    }

    #[must_use]
    pub fn handle(&self) -> SequencerHandle {
        SequencerHandle {
            generation: self.generation,
        }
    }

    #[must_use]
    pub fn view(&self) -> &SequencerView {
        &self.view
    }

    #[must_use]
    pub fn state(&self) -> SequencerState {
        self.state
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == SequencerState::Running
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state == SequencerState::Done
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Offset of the last scheduled step relative to the run start.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.steps.last().map_or(Duration::ZERO, |scheduled| scheduled.at)
    }

    fn apply(&mut self, step: Step) {
        match step {
            Step::Reveal(id) => {
                if !self.view.revealed.contains(&id) {
                    self.view.revealed.push(id);
                }
            }
            Step::BeginTyping => self.view.typed.push(String::new()),
            Step::TypeChar(ch) => {
                if let Some(current) = self.view.typed.last_mut() {
                    current.push(ch);
                }
            }
            Step::Phase(name) => self.view.phase = Some(name),
            Step::Line(content) => self.view.lines.push(content),
        }
    }
}

fn schedule(events: &[SequencerEvent], base_delay: Duration) -> Vec<ScheduledStep> {
    let mut steps = Vec::new();
    let mut cursor = Duration::ZERO;
    for event in events {
        match event {
            SequencerEvent::TypeText { text, char_delay } => {
                steps.push(ScheduledStep {
                    at: cursor,
                    step: Step::BeginTyping,
                });
                let mut offset = cursor;
                for (index, ch) in text.chars().enumerate() {
                    let index = u32::try_from(index).unwrap_or(u32::MAX);
                    offset = cursor + char_delay.saturating_mul(index);
                    steps.push(ScheduledStep {
                        at: offset,
                        step: Step::TypeChar(ch),
                    });
                }
                cursor = offset;
            }
            SequencerEvent::RevealNode(id) => {
                cursor += base_delay;
                steps.push(ScheduledStep {
                    at: cursor,
                    step: Step::Reveal(*id),
                });
            }
            SequencerEvent::SetPhase(name) => {
                cursor += base_delay;
                steps.push(ScheduledStep {
                    at: cursor,
                    step: Step::Phase(name.clone()),
                });
            }
            SequencerEvent::InsertLine(content) => {
                cursor += base_delay;
                steps.push(ScheduledStep {
                    at: cursor,
                    step: Step::Line(content.clone()),
                });
            }
        }
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: Duration = Duration::from_millis(100);

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn script() -> Vec<SequencerEvent> {
        vec![
            SequencerEvent::phase("thinking"),
            SequencerEvent::reveal(1),
            SequencerEvent::type_text("hi!", ms(10)),
            SequencerEvent::line("done"),
            SequencerEvent::reveal(2),
        ]
    }

    #[test]
    fn schedule_is_monotonic() {
        let steps = schedule(&script(), STEP);
        assert!(steps.windows(2).all(|pair| pair[0].at <= pair[1].at));
    }

    #[test]
    fn events_fire_in_order() {
        let mut seq = Sequencer::new();
        seq.start(&script(), STEP, ms(0));
        assert!(seq.view().is_empty());

        seq.poll(ms(100));
        assert_eq!(seq.view().phase.as_deref(), Some("thinking"));
        assert!(seq.view().revealed.is_empty());

        seq.poll(ms(200));
        assert_eq!(seq.view().revealed, vec![NodeId::new(1)]);
        assert_eq!(seq.view().typed, vec!["h".to_string()]);

        seq.poll(ms(215));
        assert_eq!(seq.view().typed, vec!["hi".to_string()]);

        seq.poll(ms(10_000));
        assert_eq!(seq.view().typed, vec!["hi!".to_string()]);
        assert_eq!(seq.view().lines, vec!["done".to_string()]);
        assert_eq!(seq.view().revealed, vec![NodeId::new(1), NodeId::new(2)]);
        assert!(seq.is_finished());
    }

    #[test]
    fn typing_schedules_one_step_per_char() {
        let mut seq = Sequencer::new();
        seq.start(&[SequencerEvent::type_text("abcd", ms(30))], STEP, ms(0));
        assert_eq!(seq.view().typed, vec!["a".to_string()]);
        assert_eq!(seq.next_deadline(), Some(ms(30)));
        assert_eq!(seq.poll(ms(60)), 2);
        assert_eq!(seq.view().typed, vec!["abc".to_string()]);
        assert_eq!(seq.total_duration(), ms(90));
    }

    #[test]
    fn cancel_stops_all_mutation() {
        let mut seq = Sequencer::new();
        seq.start(&script(), STEP, ms(0));
        seq.poll(ms(100));
        let snapshot = seq.view().clone();

        seq.cancel();
        seq.cancel();
        assert_eq!(seq.poll(ms(60_000)), 0);
        assert_eq!(seq.view(), &snapshot);
        assert_eq!(seq.next_deadline(), None);
        assert!(!seq.is_running());
    }

    #[test]
    fn stale_handle_cannot_poll() {
        let mut seq = Sequencer::new();
        let first = seq.start(&script(), STEP, ms(0));
        let second = seq.start(&script(), STEP, ms(50));
        assert!(!first.is_current(&seq));
        assert_eq!(seq.poll_with(first, ms(500)), 0);
        assert!(seq.view().is_empty());
        assert!(seq.poll_with(second, ms(150)) > 0);
    }

    #[test]
    fn replay_matches_first_run() {
        let mut seq = Sequencer::new();
        seq.start(&script(), STEP, ms(0));
        seq.poll(ms(10_000));
        let first = seq.view().clone();

        // Interrupt a second run half way, then replay from scratch.
        seq.start(&script(), STEP, ms(20_000));
        seq.poll(ms(20_210));
        seq.start(&script(), STEP, ms(30_000));
        assert!(seq.view().is_empty());
        seq.poll(ms(40_000));
        assert_eq!(seq.view(), &first);
    }

    #[test]
    fn reset_returns_to_idle_empty_view() {
        let mut seq = Sequencer::new();
        seq.start(&script(), STEP, ms(0));
        seq.poll(ms(300));
        seq.reset();
        assert_eq!(seq.state(), SequencerState::Idle);
        assert!(seq.view().is_empty());
    }

    #[test]
    fn empty_script_finishes_immediately() {
        let mut seq = Sequencer::new();
        seq.start(&[], STEP, ms(0));
        assert!(seq.is_finished());
        assert_eq!(seq.next_deadline(), None);
    }
}
