pub mod checkin;
pub mod config;
pub mod interval;
pub mod status;
pub mod watch;

use chrono::Utc;
use vigil_core::storage::{Config, Database, StateStore};
use vigil_core::CheckInTracker;

/// Rebuild the tracker from the persisted scalars, seeding a first
/// launch from the config default.
pub fn load_tracker(
    db: &Database,
    config: &Config,
) -> Result<CheckInTracker, Box<dyn std::error::Error>> {
    let state = db.load()?;
    let now = Utc::now();
    let last = state.last_check_in.unwrap_or(now);
    let interval = state.interval.unwrap_or_else(|| config.default_interval());
    Ok(CheckInTracker::new(last, interval)?)
}
