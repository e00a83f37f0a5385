use std::time::Duration;

/// Timing knobs shared by the tutorial controller and its visualizations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TutorialSettings {
    /// Fade-out between the last stage and the final summary.
    pub finish_fade: Duration,
    /// Fade-out of a dismissed learn tip.
    pub tip_fade: Duration,
    /// How long a hover tooltip survives after the pointer leaves.
    pub hover_grace: Duration,
    /// Delay between non-typing sequencer events.
    pub step_delay: Duration,
    /// Delay between typed characters.
    pub char_delay: Duration,
}

impl Default for TutorialSettings {
    fn default() -> Self {
        Self {
            finish_fade: Duration::from_millis(250),
            tip_fade: Duration::from_millis(300),
            hover_grace: Duration::from_millis(150),
            step_delay: Duration::from_millis(600),
            char_delay: Duration::from_millis(30),
        }
    }
}

impl TutorialSettings {
    /// Zero-delay settings so tests and reduced-motion users skip animation.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            finish_fade: Duration::ZERO,
            tip_fade: Duration::ZERO,
            hover_grace: Duration::ZERO,
            step_delay: Duration::ZERO,
            char_delay: Duration::ZERO,
        }
    }
}
