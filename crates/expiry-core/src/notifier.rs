//! Notification contract and status indicator.
//!
//! The scan cycle produces [`Notification`]s and hands them to a
//! [`Notifier`]. Desktop delivery lives in the binary; this module only
//! carries the platform independent pieces.

use std::sync::Mutex;

use serde::Serialize;
use tracing::{debug, info, warn};

/// Application name used for tooltips and notification sources.
pub const APP_NAME: &str = "expiry-watch";

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A product expires within the window.
    Upcoming,
    /// A product is past its expiry date.
    Expired,
    /// A tracked store could not be read.
    StoreUnavailable,
}

impl NotificationKind {
    /// Freedesktop icon name for this kind.
    pub fn icon_name(self) -> &'static str {
        match self {
            NotificationKind::Upcoming => "dialog-warning",
            NotificationKind::Expired => "dialog-error",
            NotificationKind::StoreUnavailable => "dialog-information",
        }
    }

    /// Whether the notification should be delivered with critical urgency.
    pub fn is_urgent(self) -> bool {
        matches!(self, NotificationKind::Expired)
    }
}

/// One notification ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// What the notification is about.
    pub kind: NotificationKind,
    /// Summary line.
    pub title: String,
    /// Body text.
    pub body: String,
}

impl Notification {
    /// Build a notification.
    pub fn new(kind: NotificationKind, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Delivers notifications to the user.
///
/// Called from the blocking pool, so implementations may block.
pub trait Notifier: Send + Sync {
    /// Deliver one notification. Delivery failures are the implementation's
    /// to log; they never abort a scan.
    fn notify(&self, notification: &Notification);
}

/// Writes notifications to the log instead of the desktop.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        match notification.kind {
            NotificationKind::Upcoming => info!("{}: {}", notification.title, notification.body),
            NotificationKind::Expired | NotificationKind::StoreUnavailable => {
                warn!("{}: {}", notification.title, notification.body)
            }
        }
    }
}

/// Keeps every notification it is given. For tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    delivered: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far.
    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }

    /// Drop everything delivered so far.
    pub fn clear(&self) {
        if let Ok(mut d) = self.delivered.lock() {
            d.clear();
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        if let Ok(mut d) = self.delivered.lock() {
            d.push(notification.clone());
        }
    }
}

/// Deliver notifications unless paused. Returns how many were delivered.
pub fn dispatch(notifier: &dyn Notifier, notifications: &[Notification], paused: bool) -> usize {
    if paused {
        debug!("Notifications paused, suppressing {}", notifications.len());
        return 0;
    }
    for notification in notifications {
        debug!("Notifying: {} / {}", notification.title, notification.body);
        notifier.notify(notification);
    }
    notifications.len()
}

/// Aggregate status across all tracked stores, shown by the tray icon.
///
/// Ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrayStatus {
    /// Nothing upcoming or expired.
    #[default]
    Normal,
    /// Something expires within the window.
    Warning,
    /// Something has expired.
    Expired,
}

impl TrayStatus {
    /// Raise the status to at least `other`. Never lowers it.
    pub fn raise(&mut self, other: TrayStatus) {
        if other > *self {
            *self = other;
        }
    }

    /// Tooltip text for the tray icon.
    pub fn tooltip(self, unavailable_stores: usize, paused: bool) -> String {
        let mut text = match self {
            TrayStatus::Normal => APP_NAME.to_string(),
            TrayStatus::Warning => format!("{} - an item is nearing expiry", APP_NAME),
            TrayStatus::Expired => format!("{} - an item has expired", APP_NAME),
        };
        match unavailable_stores {
            0 => {}
            1 => text.push_str(" (1 database unavailable)"),
            n => text.push_str(&format!(" ({} databases unavailable)", n)),
        }
        if paused {
            text.push_str(" (paused)");
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Notification> {
        vec![
            Notification::new(NotificationKind::Upcoming, "a", "b"),
            Notification::new(NotificationKind::Expired, "c", "d"),
        ]
    }

    #[test]
    fn test_dispatch_delivers_in_order() {
        let recorder = RecordingNotifier::new();
        assert_eq!(dispatch(&recorder, &sample(), false), 2);
        assert_eq!(recorder.delivered(), sample());
    }

    #[test]
    fn test_dispatch_suppressed_while_paused() {
        let recorder = RecordingNotifier::new();
        assert_eq!(dispatch(&recorder, &sample(), true), 0);
        assert!(recorder.delivered().is_empty());
    }

    #[test]
    fn test_status_never_lowers() {
        let mut status = TrayStatus::Normal;
        status.raise(TrayStatus::Expired);
        status.raise(TrayStatus::Warning);
        assert_eq!(status, TrayStatus::Expired);
    }

    #[test]
    fn test_tooltips() {
        assert_eq!(TrayStatus::Normal.tooltip(0, false), "expiry-watch");
        assert_eq!(
            TrayStatus::Warning.tooltip(0, false),
            "expiry-watch - an item is nearing expiry"
        );
        assert_eq!(
            TrayStatus::Expired.tooltip(2, true),
            "expiry-watch - an item has expired (2 databases unavailable) (paused)"
        );
        assert_eq!(
            TrayStatus::Normal.tooltip(1, false),
            "expiry-watch (1 database unavailable)"
        );
    }

    #[test]
    fn test_kind_urgency() {
        assert!(NotificationKind::Expired.is_urgent());
        assert!(!NotificationKind::Upcoming.is_urgent());
        assert!(!NotificationKind::StoreUnavailable.is_urgent());
    }
}
