//! The alarm-raise gesture: five rapid taps.
//!
//! Each tap must land within 2 s of the previous one. The fifth tap does
//! not flip the alarm by itself -- it locks the accumulator and starts a
//! 0.35 s commit delay, so the fill animation completes and the user
//! perceives a deliberate act. Taps arriving during that window, or while
//! raising is not permitted, are ignored without touching progress.
//!
//! When the inter-tap window lapses instead, accumulated progress decays
//! at a fixed rate until it drains, at which point the gesture fully
//! resets. Decay is presentational except that draining resets the count.
//!
//! The accumulator itself never touches a timer: it reports what happened
//! and the engine arms or cancels the inter-tap timeout, decay tick, and
//! commit delay accordingly.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// Taps required to raise the alarm.
pub const TAPS_TO_RAISE: u32 = 5;

/// Progress contributed by each counted tap.
pub const PROGRESS_PER_TAP: f32 = 0.2;

/// A tap more than this long after the previous one starts a new streak.
pub const TAP_WINDOW_MS: i64 = 2_000;

/// One-shot timeout armed after each counted tap; firing starts decay.
pub const INTER_TAP_TIMEOUT: Duration = Duration::from_millis(TAP_WINDOW_MS as u64);

/// Delay between the fifth tap and the alarm actually flipping.
pub const COMMIT_DELAY: Duration = Duration::from_millis(350);

/// Period of the decay timer.
pub const DECAY_TICK: Duration = Duration::from_millis(100);

/// Progress removed per decay tick.
pub const DECAY_STEP: f32 = 0.02;

/// What a tap did to the accumulator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TapOutcome {
    /// Not counted: raising is locked or the commit delay is in flight.
    Ignored,
    /// Counted toward the threshold; the inter-tap timeout should be
    /// re-armed and any running decay cancelled.
    Counted { progress: f32 },
    /// Fifth tap accepted; the commit delay should be armed. No further
    /// taps are processed until the commit fires.
    ThresholdReached,
}

/// What a decay tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DecayTick {
    /// Still draining; keep the decay timer running.
    Decaying { progress: f32 },
    /// Progress reached zero: the gesture is fully reset and the decay
    /// timer should stop.
    Drained,
}

/// Recognizer state for the five-tap alarm-raise gesture.
#[derive(Debug, Default)]
pub struct TapAccumulator {
    consecutive_taps: u32,
    last_tap_at: Option<DateTime<Utc>>,
    progress: f32,
    finalizing: bool,
}

impl TapAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visual accumulation in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// True once the fifth tap has been accepted and the commit delay is
    /// in flight.
    pub fn is_finalizing(&self) -> bool {
        self.finalizing
    }

    /// Process a tap. `allowed` is the alert machine's raise gate; a tap
    /// while it is closed must not perturb progress.
    pub fn on_tap(&mut self, now: DateTime<Utc>, allowed: bool) -> TapOutcome {
        if self.finalizing || !allowed {
            return TapOutcome::Ignored;
        }

        let within_window = self
            .last_tap_at
            .map(|prev| (now - prev).num_milliseconds() < TAP_WINDOW_MS)
            .unwrap_or(false);

        self.consecutive_taps = if within_window {
            self.consecutive_taps + 1
        } else {
            1
        };
        self.last_tap_at = Some(now);
        self.progress = (self.consecutive_taps as f32 * PROGRESS_PER_TAP).min(1.0);

        if self.consecutive_taps >= TAPS_TO_RAISE {
            self.finalizing = true;
            self.progress = 1.0;
            TapOutcome::ThresholdReached
        } else {
            TapOutcome::Counted {
                progress: self.progress,
            }
        }
    }

    /// Advance decay by one tick.
    pub fn on_decay_tick(&mut self) -> DecayTick {
        self.progress = (self.progress - DECAY_STEP).max(0.0);
        if self.progress <= 0.0 {
            self.reset();
            DecayTick::Drained
        } else {
            DecayTick::Decaying {
                progress: self.progress,
            }
        }
    }

    /// Consume the commit-delay firing. Returns true when a commit was
    /// actually pending; the accumulator is reset either way.
    pub fn take_commit(&mut self) -> bool {
        let pending = self.finalizing;
        self.reset();
        pending
    }

    /// Drop all accumulated state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
