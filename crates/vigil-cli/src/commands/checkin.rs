use chrono::Utc;
use vigil_core::notify::{LogNotifier, NotificationKind, Notifier};
use vigil_core::storage::{Config, Database, StateStore};

/// Check in: reset the deadline clock and persist it.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let config = Config::load()?;
    let mut tracker = super::load_tracker(&db, &config)?;

    let now = Utc::now();
    tracker.check_in(now);
    db.save_check_in(tracker.last_check_in(), tracker.interval())?;

    if config.notifications.enabled {
        LogNotifier.notify(NotificationKind::CheckInConfirmed);
    }

    println!(
        "Checked in. Next deadline: {} ({} from now)",
        tracker.deadline().to_rfc3339(),
        tracker.format_remaining(now)
    );
    Ok(())
}
