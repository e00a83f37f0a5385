use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// Wall-clock abstraction for timestamps recorded by the progress tracker.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: chrono::Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// Monotonic time source for animation timelines.
///
/// Sequencers and overlays take "now" as a `Duration` since an origin; this
/// is where the UI gets it. `Manual` is the fake clock used in tests.
#[derive(Debug, Clone, Copy)]
pub enum Ticker {
    Real(Instant),
    Manual(Duration),
}

impl Default for Ticker {
    fn default() -> Self {
        Self::real()
    }
}

impl Ticker {
    /// Real ticker whose origin is the moment of creation.
    #[must_use]
    pub fn real() -> Self {
        Self::Real(Instant::now())
    }

    #[must_use]
    pub fn manual() -> Self {
        Self::Manual(Duration::ZERO)
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        match self {
            Ticker::Real(origin) => origin.elapsed(),
            Ticker::Manual(at) => *at,
        }
    }

    /// Advance a manual ticker. Has no effect on a real one.
    pub fn advance(&mut self, delta: Duration) {
        if let Ticker::Manual(at) = self {
            *at += delta;
        }
    }
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
