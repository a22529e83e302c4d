//! # Vigil Core Library
//!
//! Core business logic for Vigil, a personal safety check-in app: the
//! user must confirm liveness before a rolling deadline, and can raise a
//! deliberate alarm with five rapid taps or clear one with a three-second
//! hold. All operations are available through this library; the desktop
//! and mobile shells are thin UI layers over the same core, as is the
//! standalone CLI binary.
//!
//! ## Architecture
//!
//! - **Engine**: a single-consumer event loop that owns all check-in and
//!   alert state; timers are messages fed back into the loop, never
//!   callbacks mutating shared state
//! - **Gestures**: tap accumulation (alarm raise) and hold tracking
//!   (alarm clear) as plain deterministic state machines
//! - **Storage**: SQLite-backed key/value state plus TOML configuration
//! - **Notifications**: fire-and-forget dispatch behind a trait; the
//!   host platform presents them
//!
//! ## Key Components
//!
//! - [`CheckInTracker`]: rolling deadline and remaining-time display
//! - [`AlertMachine`]: alarm lifecycle with grace-window phases
//! - [`EngineHandle`]: handle to the running engine loop
//! - [`Database`]: durable state store
//! - [`Config`]: application configuration management

pub mod alert;
pub mod checkin;
pub mod engine;
pub mod error;
pub mod events;
pub mod notify;
pub mod storage;

pub use alert::{AlertMachine, AlertPhase, HoldTracker, TapAccumulator};
pub use checkin::CheckInTracker;
pub use engine::{EngineHandle, Snapshot};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use notify::{LogNotifier, NotificationKind, Notifier, NullNotifier};
pub use storage::{Config, Database, MemoryStore, PersistedState, StateStore};
