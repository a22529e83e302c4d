//! Check-in deadline tracking.
//!
//! A check-in resets `last_check_in`; the deadline is always derived as
//! `last_check_in + interval` and never stored on its own, so an interval
//! change can never leave a stale deadline behind.
//!
//! The tracker is a plain wall-clock state machine in the same shape as
//! the rest of the gesture code: every operation takes `now` explicitly,
//! which keeps it deterministic under test. The 1 Hz display refresh that
//! re-renders `format_remaining` lives in the engine and is purely
//! presentational.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Owns the rolling check-in deadline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInTracker {
    last_check_in: DateTime<Utc>,
    interval_secs: i64,
}

impl CheckInTracker {
    /// Create a tracker from a known last check-in and interval.
    ///
    /// # Errors
    /// Returns `InvalidInterval` if the interval is not positive.
    pub fn new(last_check_in: DateTime<Utc>, interval: Duration) -> Result<Self, ValidationError> {
        let secs = interval.num_seconds();
        if secs <= 0 {
            return Err(ValidationError::InvalidInterval { seconds: secs });
        }
        Ok(Self {
            last_check_in,
            interval_secs: secs,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn last_check_in(&self) -> DateTime<Utc> {
        self.last_check_in
    }

    pub fn interval(&self) -> Duration {
        Duration::seconds(self.interval_secs)
    }

    /// `last_check_in + interval`. Recomputed on every call.
    pub fn deadline(&self) -> DateTime<Utc> {
        self.last_check_in + self.interval()
    }

    /// Time left until the deadline, clamped at zero once overdue.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        let left = self.deadline() - now;
        if left < Duration::zero() {
            Duration::zero()
        } else {
            left
        }
    }

    /// Human-readable remaining time: the two highest non-zero units
    /// among days/hours/minutes/seconds, or `"Overdue"` at zero.
    pub fn format_remaining(&self, now: DateTime<Utc>) -> String {
        format_duration(self.remaining(now))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Reset the deadline clock. Returns the new `last_check_in`.
    pub fn check_in(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.last_check_in = now;
        now
    }

    /// Change the interval, leaving `last_check_in` untouched.
    ///
    /// # Errors
    /// Returns `InvalidInterval` if the interval is not positive; the
    /// tracker is unchanged in that case.
    pub fn set_interval(&mut self, interval: Duration) -> Result<(), ValidationError> {
        let secs = interval.num_seconds();
        if secs <= 0 {
            return Err(ValidationError::InvalidInterval { seconds: secs });
        }
        self.interval_secs = secs;
        Ok(())
    }
}

fn format_duration(d: Duration) -> String {
    let total = d.num_seconds();
    if total <= 0 {
        return "Overdue".to_string();
    }

    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let units = [
        (days, "d"),
        (hours, "h"),
        (minutes, "m"),
        (seconds, "s"),
    ];

    let parts: Vec<String> = units
        .iter()
        .filter(|(value, _)| *value > 0)
        .take(2)
        .map(|(value, suffix)| format!("{value}{suffix}"))
        .collect();

    parts.join(" ")
}
