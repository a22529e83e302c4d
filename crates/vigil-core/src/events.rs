use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every committed state change in the system produces an Event.
/// The GUI subscribes to these; continuous values (countdown text,
/// gesture progress) travel on the snapshot channel instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A check-in was accepted and the deadline clock reset.
    CheckInConfirmed {
        deadline: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// The check-in interval was changed; the deadline is recomputed
    /// from the unchanged last check-in.
    IntervalChanged {
        interval_secs: i64,
        deadline: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// The alarm-raise gesture committed and the alarm is now active.
    AlarmActivated {
        at: DateTime<Utc>,
    },
    /// The alarm-clear hold completed and the alarm is now inactive.
    AlarmDeactivated {
        at: DateTime<Utc>,
    },
    /// The clear-hold crossed a feedback checkpoint (30/60/90%).
    /// Fired at most once per threshold per hold attempt.
    HapticCheckpoint {
        percent: u8,
        at: DateTime<Utc>,
    },
}
