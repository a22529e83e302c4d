//! Local notification dispatch.
//!
//! The engine only *triggers* notifications; presentation is the host
//! platform's concern. Dispatch is fire-and-forget: failures are logged
//! by the implementation and never surface into the gesture path.

use serde::{Deserialize, Serialize};
use tracing::info;

/// The three notification kinds the engine can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    CheckInConfirmed,
    AlarmActivated,
    AlarmDeactivated,
}

impl NotificationKind {
    pub fn title(self) -> &'static str {
        match self {
            NotificationKind::CheckInConfirmed => "Checked in",
            NotificationKind::AlarmActivated => "Alarm raised",
            NotificationKind::AlarmDeactivated => "Alarm cleared",
        }
    }

    pub fn body(self) -> &'static str {
        match self {
            NotificationKind::CheckInConfirmed => "Your deadline has been reset.",
            NotificationKind::AlarmActivated => "Your trusted contacts are being alerted.",
            NotificationKind::AlarmDeactivated => "The alarm has been stood down.",
        }
    }
}

/// Sink for notification requests.
///
/// `notify` must not block: the engine calls it on its own loop and does
/// not await completion. Implementations that do real I/O should hand the
/// request off internally and swallow (but log) any failure.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NotificationKind);
}

/// Notifier that writes to the tracing log. Used by the CLI, where no
/// platform notification surface exists.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, kind: NotificationKind) {
        info!(title = kind.title(), body = kind.body(), "notification");
    }
}

/// Notifier that drops every request. For tests and disabled-notification
/// configurations.
#[derive(Debug, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _kind: NotificationKind) {}
}
