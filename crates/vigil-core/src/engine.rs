//! The engine: one loop that owns every piece of check-in and alert
//! state.
//!
//! All gesture input and every timer funnel into a single mpsc consumer,
//! so no two handlers ever run concurrently and the state machines need
//! no locks. Timers never mutate state directly: arming a timer spawns a
//! task that sends a `(timer, generation)` message back into the loop.
//! Re-arming aborts the previous task and bumps the generation, and a
//! fire that was already queued when its timer was re-armed fails the
//! generation check and is discarded. That gives every named timer the
//! at-most-one-live-instance guarantee.
//!
//! Persistence writes and notification dispatch are fired from the loop
//! without being awaited; a failed write is logged and the in-memory
//! state stays authoritative. Nothing on the gesture path blocks.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::alert::{
    AlertMachine, AlertPhase, DecayTick, HoldRelease, HoldTick, HoldTracker, TapAccumulator,
    TapOutcome, COMMIT_DELAY, DECAY_TICK, GRACE_PERIOD, HOLD_TICK, INTER_TAP_TIMEOUT,
};
use crate::checkin::CheckInTracker;
use crate::error::{CoreError, ValidationError};
use crate::events::Event;
use crate::notify::{NotificationKind, Notifier};
use crate::storage::StateStore;

/// Refresh period for the countdown display.
const DISPLAY_REFRESH: Duration = Duration::from_secs(1);

/// The named timers. At most one live instance of each exists at any
/// time; arming cancels the previous instance first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TimerId {
    DisplayRefresh,
    InterTapTimeout,
    TapDecay,
    CommitDelay,
    HoldTick,
    ActivateGrace,
    DeactivateGrace,
}

impl TimerId {
    fn is_repeating(self) -> bool {
        matches!(
            self,
            TimerId::DisplayRefresh | TimerId::TapDecay | TimerId::HoldTick
        )
    }
}

enum Msg {
    Tap,
    HoldBegan,
    HoldEnded,
    CheckIn,
    SetInterval(chrono::Duration),
    SetDisplayVisible(bool),
    Timer(TimerId, u64),
    Shutdown,
}

/// Read model pushed to the UI after every processed message.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub remaining_secs: i64,
    pub remaining_text: String,
    pub tap_progress: f32,
    pub hold_progress: f32,
    pub alert_active: bool,
    pub can_activate: bool,
    pub can_deactivate: bool,
}

struct TimerSlot {
    gen: u64,
    handle: JoinHandle<()>,
}

struct Engine {
    tracker: CheckInTracker,
    alert: AlertMachine,
    tap: TapAccumulator,
    hold: HoldTracker,
    store: Arc<dyn StateStore>,
    notifier: Arc<dyn Notifier>,
    tx: mpsc::Sender<Msg>,
    snapshot_tx: watch::Sender<Snapshot>,
    events_tx: broadcast::Sender<Event>,
    timers: HashMap<TimerId, TimerSlot>,
    next_gen: u64,
}

/// Handle to a running engine.
///
/// Input methods enqueue a message for the engine loop; the snapshot
/// channel and the event stream carry everything the UI renders.
pub struct EngineHandle {
    tx: mpsc::Sender<Msg>,
    snapshot_rx: watch::Receiver<Snapshot>,
    events_tx: broadcast::Sender<Event>,
    task: JoinHandle<()>,
}

/// Start the engine on the current tokio runtime.
///
/// Reads the persisted state synchronously (once, at startup): a missing
/// last check-in means first launch, which seeds the clock at `now` with
/// `default_interval` and mirrors that to the store. A restored-active
/// alarm re-enters its activation grace window, exactly like a fresh
/// activation.
///
/// # Errors
/// Returns `InvalidInterval` if `default_interval` is not positive. A
/// store that fails to load is logged and treated as empty.
pub fn spawn(
    store: Arc<dyn StateStore>,
    notifier: Arc<dyn Notifier>,
    default_interval: chrono::Duration,
) -> Result<EngineHandle, CoreError> {
    let persisted = store.load().unwrap_or_else(|e| {
        warn!(error = %e, "failed to load persisted state; starting fresh");
        Default::default()
    });

    let now = Utc::now();
    let interval = persisted.interval.unwrap_or(default_interval);
    let first_launch = persisted.last_check_in.is_none();
    let last_check_in = persisted.last_check_in.unwrap_or(now);

    let tracker = CheckInTracker::new(last_check_in, interval)?;
    let alert = AlertMachine::restore(persisted.alert_active);

    let (tx, rx) = mpsc::channel(256);
    let (events_tx, _) = broadcast::channel(64);
    let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot {
        remaining_secs: tracker.remaining(now).num_seconds(),
        remaining_text: tracker.format_remaining(now),
        tap_progress: 0.0,
        hold_progress: 0.0,
        alert_active: alert.is_active(),
        can_activate: alert.can_activate(),
        can_deactivate: alert.can_deactivate(),
    });

    let engine = Engine {
        tracker,
        alert,
        tap: TapAccumulator::new(),
        hold: HoldTracker::new(),
        store,
        notifier,
        tx: tx.clone(),
        snapshot_tx,
        events_tx: events_tx.clone(),
        timers: HashMap::new(),
        next_gen: 0,
    };

    if first_launch {
        engine.persist_check_in();
    }

    let task = tokio::spawn(engine.run(rx));

    Ok(EngineHandle {
        tx,
        snapshot_rx,
        events_tx,
        task,
    })
}

impl EngineHandle {
    pub async fn tap(&self) {
        let _ = self.tx.send(Msg::Tap).await;
    }

    pub async fn hold_began(&self) {
        let _ = self.tx.send(Msg::HoldBegan).await;
    }

    pub async fn hold_ended(&self) {
        let _ = self.tx.send(Msg::HoldEnded).await;
    }

    pub async fn check_in(&self) {
        let _ = self.tx.send(Msg::CheckIn).await;
    }

    /// Change the check-in interval.
    ///
    /// # Errors
    /// Rejects a non-positive interval synchronously; nothing is
    /// enqueued and no state changes.
    pub async fn set_interval(&self, interval: chrono::Duration) -> Result<(), ValidationError> {
        let secs = interval.num_seconds();
        if secs <= 0 {
            return Err(ValidationError::InvalidInterval { seconds: secs });
        }
        let _ = self.tx.send(Msg::SetInterval(interval)).await;
        Ok(())
    }

    /// Start or stop the 1 Hz display refresh. Purely presentational;
    /// hide it whenever no countdown is on screen.
    pub async fn set_display_visible(&self, visible: bool) {
        let _ = self.tx.send(Msg::SetDisplayVisible(visible)).await;
    }

    /// Most recent snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Snapshot channel for change-driven rendering.
    pub fn watch_snapshots(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_rx.clone()
    }

    /// Subscribe to committed state-change events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.events_tx.subscribe()
    }

    /// Stop the loop and cancel every live timer.
    pub async fn shutdown(self) {
        let _ = self.tx.send(Msg::Shutdown).await;
        let _ = self.task.await;
    }
}

impl Engine {
    async fn run(mut self, mut rx: mpsc::Receiver<Msg>) {
        // A restored-active alarm behaves like a fresh activation: the
        // clear gate stays shut until the grace window elapses.
        if self.alert.phase() == AlertPhase::ActivatingGrace {
            self.arm(TimerId::ActivateGrace, GRACE_PERIOD);
        }
        self.push_snapshot();

        while let Some(msg) = rx.recv().await {
            if matches!(msg, Msg::Shutdown) {
                break;
            }
            self.handle(msg);
            self.push_snapshot();
        }

        for (_, slot) in self.timers.drain() {
            slot.handle.abort();
        }
    }

    fn handle(&mut self, msg: Msg) {
        let now = Utc::now();
        match msg {
            Msg::Tap => self.on_tap(now),
            Msg::HoldBegan => {
                if self.hold.begin(self.alert.can_deactivate()) {
                    self.arm(TimerId::HoldTick, HOLD_TICK);
                }
            }
            Msg::HoldEnded => match self.hold.release() {
                HoldRelease::Ignored => {}
                HoldRelease::Reset => self.cancel(TimerId::HoldTick),
                HoldRelease::Completed => {
                    self.cancel(TimerId::HoldTick);
                    self.hold.reset();
                    self.clear_alarm(now);
                }
            },
            Msg::CheckIn => {
                self.tracker.check_in(now);
                self.persist_check_in();
                self.dispatch(NotificationKind::CheckInConfirmed);
                self.emit(Event::CheckInConfirmed {
                    deadline: self.tracker.deadline(),
                    at: now,
                });
            }
            Msg::SetInterval(interval) => match self.tracker.set_interval(interval) {
                Ok(()) => {
                    self.persist_interval();
                    self.emit(Event::IntervalChanged {
                        interval_secs: interval.num_seconds(),
                        deadline: self.tracker.deadline(),
                        at: now,
                    });
                }
                // The handle validates before enqueueing.
                Err(e) => warn!(error = %e, "interval change rejected"),
            },
            Msg::SetDisplayVisible(visible) => {
                if visible {
                    self.arm(TimerId::DisplayRefresh, DISPLAY_REFRESH);
                } else {
                    self.cancel(TimerId::DisplayRefresh);
                }
            }
            Msg::Timer(id, gen) => self.on_timer(id, gen, now),
            Msg::Shutdown => unreachable!("handled by the loop"),
        }
    }

    fn on_tap(&mut self, now: DateTime<Utc>) {
        match self.tap.on_tap(now, self.alert.can_activate()) {
            TapOutcome::Ignored => {}
            TapOutcome::Counted { progress } => {
                debug!(progress = f64::from(progress), "tap counted");
                // A fresh tap always preempts decay.
                self.cancel(TimerId::TapDecay);
                self.arm(TimerId::InterTapTimeout, INTER_TAP_TIMEOUT);
            }
            TapOutcome::ThresholdReached => {
                debug!("tap threshold reached; commit delay armed");
                self.cancel(TimerId::TapDecay);
                self.cancel(TimerId::InterTapTimeout);
                self.arm(TimerId::CommitDelay, COMMIT_DELAY);
            }
        }
    }

    fn on_timer(&mut self, id: TimerId, gen: u64, now: DateTime<Utc>) {
        match self.timers.get(&id) {
            Some(slot) if slot.gen == gen => {}
            // Queued fire from a timer that has since been re-armed or
            // cancelled.
            _ => return,
        }
        if !id.is_repeating() {
            self.timers.remove(&id);
        }

        match id {
            TimerId::DisplayRefresh => {} // snapshot push after handle() re-renders
            TimerId::InterTapTimeout => {
                self.arm(TimerId::TapDecay, DECAY_TICK);
            }
            TimerId::TapDecay => {
                if let DecayTick::Drained = self.tap.on_decay_tick() {
                    self.cancel(TimerId::TapDecay);
                }
            }
            TimerId::CommitDelay => {
                if self.tap.take_commit() {
                    self.raise_alarm(now);
                }
            }
            TimerId::HoldTick => match self.hold.on_tick() {
                HoldTick::Progress {
                    checkpoint: Some(percent),
                    ..
                } => {
                    self.emit(Event::HapticCheckpoint { percent, at: now });
                }
                HoldTick::Progress { .. } => {}
                HoldTick::Completed => {
                    self.cancel(TimerId::HoldTick);
                    self.hold.reset();
                    self.clear_alarm(now);
                }
            },
            TimerId::ActivateGrace | TimerId::DeactivateGrace => {
                self.alert.grace_elapsed();
            }
        }
    }

    fn raise_alarm(&mut self, now: DateTime<Utc>) {
        if !self.alert.activate() {
            return;
        }
        debug!("alarm activated");
        self.tap.reset();
        self.persist_alert(true);
        self.dispatch(NotificationKind::AlarmActivated);
        self.emit(Event::AlarmActivated { at: now });
        self.arm(TimerId::ActivateGrace, GRACE_PERIOD);
    }

    fn clear_alarm(&mut self, now: DateTime<Utc>) {
        if !self.alert.deactivate() {
            return;
        }
        debug!("alarm deactivated");
        self.persist_alert(false);
        self.dispatch(NotificationKind::AlarmDeactivated);
        self.emit(Event::AlarmDeactivated { at: now });
        self.arm(TimerId::DeactivateGrace, GRACE_PERIOD);
    }

    // ── Timers ───────────────────────────────────────────────────────

    fn arm(&mut self, id: TimerId, period: Duration) {
        self.cancel(id);
        self.next_gen += 1;
        let gen = self.next_gen;
        let tx = self.tx.clone();

        let handle = if id.is_repeating() {
            tokio::spawn(async move {
                let start = tokio::time::Instant::now() + period;
                let mut interval = tokio::time::interval_at(start, period);
                loop {
                    interval.tick().await;
                    if tx.send(Msg::Timer(id, gen)).await.is_err() {
                        break;
                    }
                }
            })
        } else {
            tokio::spawn(async move {
                tokio::time::sleep(period).await;
                let _ = tx.send(Msg::Timer(id, gen)).await;
            })
        };

        self.timers.insert(id, TimerSlot { gen, handle });
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(slot) = self.timers.remove(&id) {
            slot.handle.abort();
        }
    }

    // ── Side effects (fire-and-forget) ───────────────────────────────

    fn persist_check_in(&self) {
        let store = Arc::clone(&self.store);
        let last = self.tracker.last_check_in();
        let interval = self.tracker.interval();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = store.save_check_in(last, interval) {
                warn!(error = %e, "failed to persist check-in");
            }
        });
    }

    fn persist_interval(&self) {
        let store = Arc::clone(&self.store);
        let interval = self.tracker.interval();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = store.save_interval(interval) {
                warn!(error = %e, "failed to persist interval");
            }
        });
    }

    fn persist_alert(&self, active: bool) {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || {
            if let Err(e) = store.save_alert_active(active) {
                warn!(error = %e, "failed to persist alarm flag");
            }
        });
    }

    fn dispatch(&self, kind: NotificationKind) {
        // Notifier::notify must not block (see the trait contract).
        self.notifier.notify(kind);
    }

    fn emit(&self, event: Event) {
        let _ = self.events_tx.send(event);
    }

    fn push_snapshot(&self) {
        let now = Utc::now();
        self.snapshot_tx.send_replace(Snapshot {
            remaining_secs: self.tracker.remaining(now).num_seconds(),
            remaining_text: self.tracker.format_remaining(now),
            tap_progress: self.tap.progress(),
            hold_progress: self.hold.progress(),
            alert_active: self.alert.is_active(),
            can_activate: self.alert.can_activate(),
            can_deactivate: self.alert.can_deactivate(),
        });
    }
}
