//! End-to-end tests for the live engine: gesture timing, grace windows,
//! and persistence, driven through the public handle.
//!
//! The timing-sensitive tests run under tokio's paused clock and step it
//! explicitly with `time::advance`; chrono wall-clock reads still move in
//! real time, which only matters for the inter-tap window -- and taps
//! issued back-to-back in a test land well inside it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use tokio::time;

use vigil_core::engine;
use vigil_core::{Event, MemoryStore, NullNotifier, StateStore};

/// Let the engine loop drain everything queued without letting the
/// runtime go idle (idleness would auto-advance the paused clock).
async fn settle() {
    for _ in 0..200 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn five_taps_then_hold_clears() {
    let store = Arc::new(MemoryStore::seeded(
        Utc::now() - ChronoDuration::hours(5),
        ChronoDuration::hours(12),
        false,
    ));
    let handle = engine::spawn(
        Arc::clone(&store) as Arc<dyn StateStore>,
        Arc::new(NullNotifier),
        ChronoDuration::hours(24),
    )
    .unwrap();
    settle().await;

    let snap = handle.snapshot();
    assert!(!snap.alert_active);
    assert!(snap.can_activate);
    // interval 12h, last check-in 5h ago -> about 7h left.
    assert!(snap.remaining_secs > 7 * 3600 - 5 && snap.remaining_secs <= 7 * 3600);

    let mut events = handle.subscribe_events();

    for _ in 0..5 {
        handle.tap().await;
        settle().await;
    }
    let snap = handle.snapshot();
    assert_eq!(snap.tap_progress, 1.0);
    // The commit delay is still in flight; the alarm has not flipped.
    assert!(!snap.alert_active);

    // A sixth tap during finalization changes nothing.
    handle.tap().await;
    settle().await;
    assert!(!handle.snapshot().alert_active);

    time::advance(Duration::from_millis(350)).await;
    settle().await;
    let snap = handle.snapshot();
    assert!(snap.alert_active);
    assert!(!snap.can_activate);
    assert!(!snap.can_deactivate);
    assert_eq!(snap.tap_progress, 0.0);

    // Clear gate opens only once the grace window elapses.
    time::advance(Duration::from_secs(2)).await;
    settle().await;
    assert!(handle.snapshot().can_deactivate);

    handle.hold_began().await;
    settle().await;
    time::advance(Duration::from_secs(3)).await;
    settle().await;
    let snap = handle.snapshot();
    assert!(!snap.alert_active);
    assert!(!snap.can_activate); // deactivation grace
    assert_eq!(snap.hold_progress, 0.0);

    time::advance(Duration::from_secs(2)).await;
    settle().await;
    assert!(handle.snapshot().can_activate);

    let mut saw_activated = false;
    let mut saw_deactivated = false;
    let mut checkpoints = Vec::new();
    while let Ok(event) = events.try_recv() {
        match event {
            Event::AlarmActivated { .. } => saw_activated = true,
            Event::AlarmDeactivated { .. } => saw_deactivated = true,
            Event::HapticCheckpoint { percent, .. } => checkpoints.push(percent),
            _ => {}
        }
    }
    assert!(saw_activated);
    assert!(saw_deactivated);
    assert_eq!(checkpoints, vec![30, 60, 90]);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn tap_streak_decays_after_timeout() {
    let store = Arc::new(MemoryStore::new());
    let handle = engine::spawn(
        store as Arc<dyn StateStore>,
        Arc::new(NullNotifier),
        ChronoDuration::hours(24),
    )
    .unwrap();
    settle().await;

    handle.tap().await;
    handle.tap().await;
    settle().await;
    assert!((handle.snapshot().tap_progress - 0.4).abs() < 1e-6);

    // Inter-tap window lapses; decay runs until the gesture drains.
    time::advance(Duration::from_secs(2)).await;
    settle().await;
    time::advance(Duration::from_secs(3)).await;
    settle().await;
    assert_eq!(handle.snapshot().tap_progress, 0.0);

    // Drained decay fully reset the streak: a new tap starts at one.
    handle.tap().await;
    settle().await;
    assert!((handle.snapshot().tap_progress - 0.2).abs() < 1e-6);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn early_release_leaves_alarm_active() {
    let store = Arc::new(MemoryStore::seeded(
        Utc::now(),
        ChronoDuration::hours(24),
        true,
    ));
    let handle = engine::spawn(
        store as Arc<dyn StateStore>,
        Arc::new(NullNotifier),
        ChronoDuration::hours(24),
    )
    .unwrap();
    settle().await;

    // Restored-active behaves like a fresh activation.
    let snap = handle.snapshot();
    assert!(snap.alert_active);
    assert!(!snap.can_deactivate);

    time::advance(Duration::from_secs(2)).await;
    settle().await;
    assert!(handle.snapshot().can_deactivate);

    handle.hold_began().await;
    settle().await;
    time::advance(Duration::from_millis(1_500)).await;
    settle().await;
    let snap = handle.snapshot();
    assert!((snap.hold_progress - 0.5).abs() < 0.02);

    handle.hold_ended().await;
    settle().await;
    let snap = handle.snapshot();
    assert_eq!(snap.hold_progress, 0.0);
    assert!(snap.alert_active);
    assert!(snap.can_deactivate);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn taps_are_ignored_while_alarm_active() {
    let store = Arc::new(MemoryStore::seeded(
        Utc::now(),
        ChronoDuration::hours(24),
        true,
    ));
    let handle = engine::spawn(
        store as Arc<dyn StateStore>,
        Arc::new(NullNotifier),
        ChronoDuration::hours(24),
    )
    .unwrap();
    settle().await;

    for _ in 0..5 {
        handle.tap().await;
    }
    settle().await;
    let snap = handle.snapshot();
    assert_eq!(snap.tap_progress, 0.0);
    assert!(snap.alert_active);

    // Still ignored after the activation grace elapses.
    time::advance(Duration::from_secs(2)).await;
    settle().await;
    for _ in 0..5 {
        handle.tap().await;
    }
    settle().await;
    time::advance(Duration::from_millis(350)).await;
    settle().await;
    assert_eq!(handle.snapshot().tap_progress, 0.0);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn interval_rejection_is_synchronous() {
    let store = Arc::new(MemoryStore::new());
    let handle = engine::spawn(
        store as Arc<dyn StateStore>,
        Arc::new(NullNotifier),
        ChronoDuration::hours(24),
    )
    .unwrap();
    settle().await;

    assert!(handle.set_interval(ChronoDuration::zero()).await.is_err());
    assert!(handle
        .set_interval(ChronoDuration::seconds(-10))
        .await
        .is_err());
    assert!(handle.set_interval(ChronoDuration::hours(8)).await.is_ok());
    settle().await;

    handle.shutdown().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn committed_state_reaches_the_store() {
    let store = Arc::new(MemoryStore::new());
    let handle = engine::spawn(
        Arc::clone(&store) as Arc<dyn StateStore>,
        Arc::new(NullNotifier),
        ChronoDuration::hours(24),
    )
    .unwrap();

    // First launch seeds the clock.
    time::sleep(Duration::from_millis(100)).await;
    let persisted = store.load().unwrap();
    assert!(persisted.last_check_in.is_some());
    assert_eq!(persisted.interval.unwrap(), ChronoDuration::hours(24));

    handle.set_interval(ChronoDuration::hours(16)).await.unwrap();
    time::sleep(Duration::from_millis(100)).await;
    assert_eq!(
        store.load().unwrap().interval.unwrap(),
        ChronoDuration::hours(16)
    );

    for _ in 0..5 {
        handle.tap().await;
    }
    time::sleep(Duration::from_millis(600)).await; // past the commit delay
    assert!(store.load().unwrap().alert_active);

    time::sleep(Duration::from_millis(2_100)).await; // grace
    handle.hold_began().await;
    time::sleep(Duration::from_millis(3_300)).await; // full hold
    assert!(!store.load().unwrap().alert_active);

    handle.shutdown().await;
}
