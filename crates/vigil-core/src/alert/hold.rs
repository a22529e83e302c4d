//! The alarm-clear gesture: a continuous three-second hold.
//!
//! Progress advances a fixed step per 0.05 s tick and reaches 1.0 after
//! 3.0 s. Any early release resets progress to zero -- no partial credit
//! survives a release, which is what makes an accidental clear hard.
//! Feedback checkpoints fire at 30/60/90%, once per hold attempt.
//!
//! Progress is derived from an integer tick count so that sixty ticks
//! land on exactly 1.0; accumulating the f32 step would drift.

use std::time::Duration;

/// Period of the hold tick timer.
pub const HOLD_TICK: Duration = Duration::from_millis(50);

/// Ticks required to clear the alarm (3.0 s at 20 ticks/sec).
pub const TICKS_TO_CLEAR: u32 = 60;

/// Percent thresholds at which a haptic checkpoint fires.
pub const CHECKPOINTS: [u8; 3] = [30, 60, 90];

/// What a hold tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoldTick {
    /// Still holding. `checkpoint` is set when this tick crossed one of
    /// the feedback thresholds.
    Progress { progress: f32, checkpoint: Option<u8> },
    /// The hold reached full duration; the alarm should clear and the
    /// tick timer stop.
    Completed,
}

/// What a release did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldRelease {
    /// No hold was in flight.
    Ignored,
    /// Released early: progress dropped back to zero.
    Reset,
    /// The hold had already completed; the clear still applies.
    Completed,
}

/// Recognizer state for the hold-to-clear gesture.
#[derive(Debug, Default)]
pub struct HoldTracker {
    holding: bool,
    ticks: u32,
    checkpoints_fired: [bool; 3],
}

impl HoldTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// Progress in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        (self.ticks as f32 / TICKS_TO_CLEAR as f32).min(1.0)
    }

    /// Start a hold attempt. `allowed` is the alert machine's clear gate;
    /// returns true when the attempt started and the tick timer should be
    /// armed. A begin while already holding is a no-op.
    pub fn begin(&mut self, allowed: bool) -> bool {
        if !allowed || self.holding {
            return false;
        }
        self.holding = true;
        self.ticks = 0;
        self.checkpoints_fired = [false; 3];
        true
    }

    /// Advance the hold by one tick.
    pub fn on_tick(&mut self) -> HoldTick {
        if !self.holding {
            return HoldTick::Progress {
                progress: self.progress(),
                checkpoint: None,
            };
        }

        self.ticks += 1;
        if self.ticks >= TICKS_TO_CLEAR {
            return HoldTick::Completed;
        }

        let percent = self.ticks * 100 / TICKS_TO_CLEAR;
        let mut checkpoint = None;
        for (i, threshold) in CHECKPOINTS.iter().enumerate() {
            if percent >= *threshold as u32 && !self.checkpoints_fired[i] {
                self.checkpoints_fired[i] = true;
                checkpoint = Some(*threshold);
                break;
            }
        }

        HoldTick::Progress {
            progress: self.progress(),
            checkpoint,
        }
    }

    /// Process the user releasing the press.
    ///
    /// Completion observed on a tick wins over a queued release: a hold
    /// that already reached full duration still clears the alarm.
    pub fn release(&mut self) -> HoldRelease {
        if !self.holding {
            return HoldRelease::Ignored;
        }
        if self.ticks >= TICKS_TO_CLEAR {
            self.holding = false;
            HoldRelease::Completed
        } else {
            self.reset();
            HoldRelease::Reset
        }
    }

    /// Drop all hold state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_requires_permission() {
        let mut hold = HoldTracker::new();
        assert!(!hold.begin(false));
        assert!(!hold.is_holding());

        assert!(hold.begin(true));
        assert!(hold.is_holding());
        // A second begin while holding does not restart progress.
        for _ in 0..10 {
            hold.on_tick();
        }
        assert!(!hold.begin(true));
        assert!(hold.progress() > 0.0);
    }

    #[test]
    fn completes_after_full_duration() {
        let mut hold = HoldTracker::new();
        hold.begin(true);

        for tick in 1..TICKS_TO_CLEAR {
            match hold.on_tick() {
                HoldTick::Progress { progress, .. } => {
                    assert!((progress - tick as f32 / 60.0).abs() < 1e-6)
                }
                HoldTick::Completed => panic!("completed early at tick {tick}"),
            }
        }
        assert_eq!(hold.on_tick(), HoldTick::Completed);
    }

    #[test]
    fn checkpoints_fire_once_each() {
        let mut hold = HoldTracker::new();
        hold.begin(true);

        let mut fired = Vec::new();
        for _ in 1..TICKS_TO_CLEAR {
            if let HoldTick::Progress {
                checkpoint: Some(pct),
                ..
            } = hold.on_tick()
            {
                fired.push(pct);
            }
        }
        assert_eq!(fired, vec![30, 60, 90]);
    }

    #[test]
    fn early_release_resets_progress() {
        let mut hold = HoldTracker::new();
        hold.begin(true);
        for _ in 0..30 {
            hold.on_tick();
        }
        assert!((hold.progress() - 0.5).abs() < 1e-6);

        assert_eq!(hold.release(), HoldRelease::Reset);
        assert!(!hold.is_holding());
        assert_eq!(hold.progress(), 0.0);
    }

    #[test]
    fn release_after_completion_still_clears() {
        let mut hold = HoldTracker::new();
        hold.begin(true);
        for _ in 0..TICKS_TO_CLEAR {
            hold.on_tick();
        }
        assert_eq!(hold.release(), HoldRelease::Completed);
    }

    #[test]
    fn release_without_hold_is_ignored() {
        let mut hold = HoldTracker::new();
        assert_eq!(hold.release(), HoldRelease::Ignored);
    }

    #[test]
    fn checkpoints_rearm_on_new_attempt() {
        let mut hold = HoldTracker::new();
        hold.begin(true);
        for _ in 0..20 {
            hold.on_tick(); // crosses 30%
        }
        hold.release();

        hold.begin(true);
        let mut fired = Vec::new();
        for _ in 1..TICKS_TO_CLEAR {
            if let HoldTick::Progress {
                checkpoint: Some(pct),
                ..
            } = hold.on_tick()
            {
                fired.push(pct);
            }
        }
        assert_eq!(fired, vec![30, 60, 90]);
    }
}
