//! Alarm state as an explicit phase machine.
//!
//! The raise and clear gestures are gated by two-second grace windows so
//! that the trailing touches of one gesture cannot be reinterpreted as
//! the start of the opposite one. Modelling the grace windows as phases
//! of one tagged union (rather than loose booleans) makes the invalid
//! combinations unrepresentable: the raise gate is open exactly in
//! `Inactive`, the clear gate exactly in `Active`.
//!
//! ```text
//!              raise commit              grace elapsed
//!  Inactive ───────────────► ActivatingGrace ─────────► Active
//!     ▲                                                   │
//!     │ grace elapsed                        hold complete │
//!     └───────────── DeactivatingGrace ◄──────────────────┘
//! ```
//!
//! Only the `Inactive`/`Active` distinction is persisted. On a cold start
//! a restored-active alarm re-enters `ActivatingGrace` -- no in-flight
//! touch can be trusted across a restart, so it is treated exactly like a
//! fresh activation -- while a restored-inactive alarm starts permissive,
//! since no lingering touches are possible either.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Grace window after each transition during which the reverse gesture
/// stays locked.
pub const GRACE_PERIOD: Duration = Duration::from_secs(2);

/// Phase of the alarm lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertPhase {
    Inactive,
    /// Alarm just raised; the clear gesture is locked until the grace
    /// window elapses.
    ActivatingGrace,
    Active,
    /// Alarm just cleared; the raise gesture is locked until the grace
    /// window elapses.
    DeactivatingGrace,
}

/// The authoritative alarm state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertMachine {
    phase: AlertPhase,
}

impl AlertMachine {
    /// Fresh machine with no alarm raised.
    pub fn new() -> Self {
        Self {
            phase: AlertPhase::Inactive,
        }
    }

    /// Rebuild from the persisted flag, per the cold-start rule above.
    /// A machine restored active expects its grace timer to be re-armed.
    pub fn restore(alert_active: bool) -> Self {
        Self {
            phase: if alert_active {
                AlertPhase::ActivatingGrace
            } else {
                AlertPhase::Inactive
            },
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> AlertPhase {
        self.phase
    }

    /// The persisted flag: is the alarm raised?
    pub fn is_active(&self) -> bool {
        matches!(
            self.phase,
            AlertPhase::ActivatingGrace | AlertPhase::Active
        )
    }

    /// May taps accumulate toward raising the alarm?
    pub fn can_activate(&self) -> bool {
        self.phase == AlertPhase::Inactive
    }

    /// May a hold complete and clear the alarm?
    pub fn can_deactivate(&self) -> bool {
        self.phase == AlertPhase::Active
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Raise the alarm. Returns false (unchanged) unless raising is
    /// currently legal.
    pub fn activate(&mut self) -> bool {
        if !self.can_activate() {
            return false;
        }
        self.phase = AlertPhase::ActivatingGrace;
        true
    }

    /// Clear the alarm. Returns false (unchanged) unless clearing is
    /// currently legal.
    pub fn deactivate(&mut self) -> bool {
        if !self.can_deactivate() {
            return false;
        }
        self.phase = AlertPhase::DeactivatingGrace;
        true
    }

    /// A grace timer fired: open the gate for the current phase.
    /// Returns false when no grace window was in flight (a stale fire).
    pub fn grace_elapsed(&mut self) -> bool {
        match self.phase {
            AlertPhase::ActivatingGrace => {
                self.phase = AlertPhase::Active;
                true
            }
            AlertPhase::DeactivatingGrace => {
                self.phase = AlertPhase::Inactive;
                true
            }
            AlertPhase::Inactive | AlertPhase::Active => false,
        }
    }
}

impl Default for AlertMachine {
    fn default() -> Self {
        Self::new()
    }
}
