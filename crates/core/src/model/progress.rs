use serde::{Deserialize, Serialize};

/// Value persisted for a module that has not been started.
pub const NOT_STARTED: i64 = -1;

//
// ─── STAGE POSITION ───────────────────────────────────────────────────────────
//

/// Where a learner currently is inside a module.
///
/// Persisted as a single integer: `-1` before the first stage, `0..N-1` while
/// inside a stage and `N` once the module is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StagePosition {
    #[default]
    NotStarted,
    InStage(usize),
    Finished,
}

impl StagePosition {
    /// Rehydrate a position from the persisted integer.
    ///
    /// Values below `-1` are treated as not started and values above the
    /// stage count as finished, so a shrunk module never resumes out of range.
    #[must_use]
    pub fn from_persisted(value: i64, stage_count: usize) -> Self {
        if value < 0 || stage_count == 0 {
            return Self::NotStarted;
        }
        match usize::try_from(value) {
            Ok(index) if index < stage_count => Self::InStage(index),
            _ => Self::Finished,
        }
    }

    /// Integer representation written to storage.
    #[must_use]
    pub fn to_persisted(self, stage_count: usize) -> i64 {
        match self {
            Self::NotStarted => NOT_STARTED,
            Self::InStage(index) => i64::try_from(index).unwrap_or(i64::MAX),
            Self::Finished => i64::try_from(stage_count).unwrap_or(i64::MAX),
        }
    }

    #[must_use]
    pub fn stage(self) -> Option<usize> {
        match self {
            Self::InStage(index) => Some(index),
            Self::NotStarted | Self::Finished => None,
        }
    }

    #[must_use]
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Finished)
    }
}

//
// ─── MODULE PROGRESS ──────────────────────────────────────────────────────────
//

/// Current position plus the session high-water mark.
///
/// `max_reached` is the running maximum of every stage index observed and
/// never decreases except through [`ModuleProgress::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModuleProgress {
    current: StagePosition,
    max_reached: Option<usize>,
    stage_count: usize,
}

impl ModuleProgress {
    #[must_use]
    pub fn new(stage_count: usize) -> Self {
        Self {
            current: StagePosition::NotStarted,
            max_reached: None,
            stage_count,
        }
    }

    /// Restore progress from a persisted stage value.
    #[must_use]
    pub fn resume(stage_count: usize, persisted: Option<i64>) -> Self {
        let mut progress = Self::new(stage_count);
        let position = persisted.map_or(StagePosition::NotStarted, |value| {
            StagePosition::from_persisted(value, stage_count)
        });
        progress.observe(position);
        progress
    }

    /// Move to `position` and fold it into the high-water mark.
    pub fn observe(&mut self, position: StagePosition) {
        self.current = position;
        let reached = match position {
            StagePosition::NotStarted => None,
            StagePosition::InStage(index) => Some(index),
            StagePosition::Finished => self.stage_count.checked_sub(1),
        };
        if let Some(reached) = reached {
            self.max_reached = Some(self.max_reached.map_or(reached, |max| max.max(reached)));
        }
    }

    /// Forget all progress, including the high-water mark.
    pub fn reset(&mut self) {
        self.current = StagePosition::NotStarted;
        self.max_reached = None;
    }

    #[must_use]
    pub fn current(&self) -> StagePosition {
        self.current
    }

    /// Highest stage index reached this session, `None` before the first stage.
    #[must_use]
    pub fn max_reached(&self) -> Option<usize> {
        self.max_reached
    }

    /// `max_reached` in its persisted integer form (`-1` when unset).
    #[must_use]
    pub fn max_reached_value(&self) -> i64 {
        self.max_reached
            .map_or(NOT_STARTED, |max| i64::try_from(max).unwrap_or(i64::MAX))
    }

    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stage_count
    }

    /// Stage `index` can be jumped to directly from the stepper.
    #[must_use]
    pub fn is_navigable(&self, index: usize) -> bool {
        index < self.stage_count && self.max_reached.is_some_and(|max| index <= max)
    }

    #[must_use]
    pub fn persisted_value(&self) -> i64 {
        self.current.to_persisted(self.stage_count)
    }

    /// Completion percentage for progress bars (0-100).
    #[must_use]
    pub fn percent(&self) -> u8 {
        match self.current {
            StagePosition::NotStarted => 0,
            StagePosition::Finished => 100,
            StagePosition::InStage(index) => {
                let pct = index.saturating_mul(100) / self.stage_count.max(1);
                u8::try_from(pct).unwrap_or(100)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persisted_values_map_to_positions() {
        assert_eq!(StagePosition::from_persisted(-1, 3), StagePosition::NotStarted);
        assert_eq!(StagePosition::from_persisted(0, 3), StagePosition::InStage(0));
        assert_eq!(StagePosition::from_persisted(2, 3), StagePosition::InStage(2));
        assert_eq!(StagePosition::from_persisted(3, 3), StagePosition::Finished);
    }

    #[test]
    fn persisted_values_out_of_range_are_clamped() {
        assert_eq!(StagePosition::from_persisted(-9, 3), StagePosition::NotStarted);
        assert_eq!(StagePosition::from_persisted(42, 3), StagePosition::Finished);
    }

    #[test]
    fn positions_round_trip_through_persisted_form() {
        for value in -1..=4 {
            let position = StagePosition::from_persisted(value, 4);
            assert_eq!(position.to_persisted(4), value);
        }
    }

    #[test]
    fn max_reached_is_running_maximum() {
        let mut progress = ModuleProgress::new(5);
        for index in [0, 1, 2, 1, 0, 3, 2] {
            progress.observe(StagePosition::InStage(index));
        }
        assert_eq!(progress.max_reached(), Some(3));
        assert_eq!(progress.current(), StagePosition::InStage(2));
    }

    #[test]
    fn navigable_only_up_to_max_reached() {
        let mut progress = ModuleProgress::new(4);
        assert!(!progress.is_navigable(0));
        progress.observe(StagePosition::InStage(1));
        assert!(progress.is_navigable(0));
        assert!(progress.is_navigable(1));
        assert!(!progress.is_navigable(2));
    }

    #[test]
    fn resume_derives_max_from_persisted_stage() {
        let progress = ModuleProgress::resume(4, Some(2));
        assert_eq!(progress.current(), StagePosition::InStage(2));
        assert_eq!(progress.max_reached(), Some(2));

        let finished = ModuleProgress::resume(4, Some(4));
        assert_eq!(finished.max_reached(), Some(3));

        let fresh = ModuleProgress::resume(4, None);
        assert_eq!(fresh.max_reached_value(), NOT_STARTED);
    }

    #[test]
    fn reset_clears_high_water_mark() {
        let mut progress = ModuleProgress::new(3);
        progress.observe(StagePosition::InStage(2));
        progress.reset();
        assert_eq!(progress.current(), StagePosition::NotStarted);
        assert_eq!(progress.max_reached(), None);
    }

    #[test]
    fn percent_tracks_position() {
        let mut progress = ModuleProgress::new(4);
        assert_eq!(progress.percent(), 0);
        progress.observe(StagePosition::InStage(2));
        assert_eq!(progress.percent(), 50);
        progress.observe(StagePosition::Finished);
        assert_eq!(progress.percent(), 100);
    }
}
