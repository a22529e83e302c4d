use chrono::{DateTime, Utc};
use serde::Serialize;
use vigil_core::storage::{Config, Database, StateStore};

#[derive(Serialize)]
struct StatusView {
    last_check_in: DateTime<Utc>,
    interval_secs: i64,
    deadline: DateTime<Utc>,
    remaining_secs: i64,
    remaining: String,
    alert_active: bool,
}

/// Print the persisted state as JSON.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load()?;
    let tracker = super::load_tracker(&db, &config)?;
    let alert_active = db.load()?.alert_active;

    let now = Utc::now();
    let view = StatusView {
        last_check_in: tracker.last_check_in(),
        interval_secs: tracker.interval().num_seconds(),
        deadline: tracker.deadline(),
        remaining_secs: tracker.remaining(now).num_seconds(),
        remaining: tracker.format_remaining(now),
        alert_active,
    };

    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}
