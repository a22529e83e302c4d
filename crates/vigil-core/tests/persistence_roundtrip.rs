//! Round-trip tests through the real SQLite store: what a session
//! persists, a fresh process must reproduce.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use tokio::time;

use vigil_core::engine;
use vigil_core::{AlertMachine, CheckInTracker, Database, NullNotifier, StateStore};

#[test]
fn sqlite_roundtrip_reproduces_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vigil.db");

    let last = Utc::now() - ChronoDuration::hours(5);
    {
        let db = Database::open_at(&path).unwrap();
        db.save_check_in(last, ChronoDuration::hours(12)).unwrap();
        db.save_alert_active(true).unwrap();
    }

    // A fresh handle on the same file sees the same scalars.
    let db = Database::open_at(&path).unwrap();
    let state = db.load().unwrap();
    assert_eq!(state.last_check_in.unwrap(), last);
    assert_eq!(state.interval.unwrap(), ChronoDuration::hours(12));
    assert!(state.alert_active);

    // And they rebuild the same remaining time...
    let now = Utc::now();
    let tracker = CheckInTracker::new(state.last_check_in.unwrap(), state.interval.unwrap()).unwrap();
    let remaining = tracker.remaining(now).num_seconds();
    assert!(remaining > 7 * 3600 - 5 && remaining <= 7 * 3600);

    // ...and the cold-start alarm rule: restored-active re-locks the
    // clear gate until the grace window is re-run.
    let machine = AlertMachine::restore(state.alert_active);
    assert!(machine.is_active());
    assert!(!machine.can_deactivate());
}

#[tokio::test(start_paused = true)]
async fn engine_cold_start_from_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vigil.db");
    {
        let db = Database::open_at(&path).unwrap();
        db.save_check_in(Utc::now() - ChronoDuration::hours(2), ChronoDuration::hours(8))
            .unwrap();
        db.save_alert_active(true).unwrap();
    }

    let store = Arc::new(Database::open_at(&path).unwrap());
    let handle = engine::spawn(
        store as Arc<dyn StateStore>,
        Arc::new(NullNotifier),
        ChronoDuration::hours(24),
    )
    .unwrap();
    for _ in 0..200 {
        tokio::task::yield_now().await;
    }

    let snap = handle.snapshot();
    assert!(snap.alert_active);
    assert!(!snap.can_deactivate);
    assert!(!snap.can_activate);
    assert!(snap.remaining_secs > 6 * 3600 - 5 && snap.remaining_secs <= 6 * 3600);

    // The activation grace is re-armed on restore.
    time::advance(Duration::from_secs(2)).await;
    for _ in 0..200 {
        tokio::task::yield_now().await;
    }
    assert!(handle.snapshot().can_deactivate);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn first_launch_uses_default_interval() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(Database::open_at(&dir.path().join("vigil.db")).unwrap());
    let handle = engine::spawn(
        store as Arc<dyn StateStore>,
        Arc::new(NullNotifier),
        ChronoDuration::hours(24),
    )
    .unwrap();
    for _ in 0..200 {
        tokio::task::yield_now().await;
    }

    let snap = handle.snapshot();
    assert!(!snap.alert_active);
    assert!(snap.can_activate);
    assert!(snap.remaining_secs > 24 * 3600 - 5 && snap.remaining_secs <= 24 * 3600);

    handle.shutdown().await;
}
