//! The scan cycle.
//!
//! One cycle visits every tracked store, collects upcoming and expired
//! products, and turns each into an [`Alert`]. Stores that cannot be read are
//! recorded as [`StoreFailure`]s; the remaining stores are still scanned.

use expiry_store::{ExpiryWindow, Product, ProductStore};
use serde::Serialize;
use time::Date;
use tracing::{debug, info, warn};

use crate::notifier::{Notification, NotificationKind, TrayStatus};
use crate::settings::TrackedStore;

/// Which side of the window a product falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryKind {
    /// Expires today or within the window.
    Upcoming,
    /// Expired before today.
    Expired,
}

impl ExpiryKind {
    /// Classify a date against a window. `None` when it is beyond the window.
    pub fn classify(window: &ExpiryWindow, expiry_date: Date) -> Option<Self> {
        if window.is_upcoming(expiry_date) {
            Some(ExpiryKind::Upcoming)
        } else if window.is_expired(expiry_date) {
            Some(ExpiryKind::Expired)
        } else {
            None
        }
    }

    /// Status this kind raises the tray to.
    pub fn status(self) -> TrayStatus {
        match self {
            ExpiryKind::Upcoming => TrayStatus::Warning,
            ExpiryKind::Expired => TrayStatus::Expired,
        }
    }
}

impl From<ExpiryKind> for NotificationKind {
    fn from(kind: ExpiryKind) -> Self {
        match kind {
            ExpiryKind::Upcoming => NotificationKind::Upcoming,
            ExpiryKind::Expired => NotificationKind::Expired,
        }
    }
}

/// What an alert reports about its product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AlertState {
    /// Expires today or within the window.
    Upcoming {
        /// Days left, counting today.
        days_remaining: i64,
    },
    /// Expired before today.
    Expired,
}

impl AlertState {
    /// The classification this state belongs to.
    pub fn kind(self) -> ExpiryKind {
        match self {
            AlertState::Upcoming { .. } => ExpiryKind::Upcoming,
            AlertState::Expired => ExpiryKind::Expired,
        }
    }
}

/// One product that needs the user's attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    /// Display name of the store holding the product.
    pub store: String,
    /// The product.
    pub product: Product,
    /// Upcoming (with the days left) or expired.
    #[serde(flatten)]
    pub state: AlertState,
}

impl Alert {
    /// Build the alert for a product, or `None` if it needs no attention.
    pub fn for_product(store: &str, product: Product, window: &ExpiryWindow) -> Option<Self> {
        let state = match ExpiryKind::classify(window, product.expiry_date)? {
            ExpiryKind::Upcoming => AlertState::Upcoming {
                days_remaining: window.days_remaining(product.expiry_date),
            },
            ExpiryKind::Expired => AlertState::Expired,
        };
        Some(Self {
            store: store.to_string(),
            product,
            state,
        })
    }

    /// Upcoming or expired.
    pub fn kind(&self) -> ExpiryKind {
        self.state.kind()
    }

    /// Notification summary line.
    pub fn title(&self) -> String {
        match self.state {
            AlertState::Upcoming { .. } => format!("Upcoming expiry in \"{}\"", self.store),
            AlertState::Expired => format!("Expiry in \"{}\"", self.store),
        }
    }

    /// Notification body.
    pub fn message(&self) -> String {
        match self.state {
            AlertState::Upcoming { days_remaining } => {
                let unit = if days_remaining == 1 { "day" } else { "days" };
                format!(
                    "\"{}\" is expiring in {} {}.",
                    self.product.name, days_remaining, unit
                )
            }
            AlertState::Expired => format!("\"{}\" has now expired", self.product.name),
        }
    }

    /// The notification for this alert.
    pub fn notification(&self) -> Notification {
        Notification::new(self.kind().into(), self.title(), self.message())
    }
}

/// A tracked store that could not be scanned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreFailure {
    /// The store.
    pub store: TrackedStore,
    /// Why it failed.
    pub reason: String,
}

impl StoreFailure {
    /// The notification reporting this failure.
    pub fn notification(&self) -> Notification {
        Notification::new(
            NotificationKind::StoreUnavailable,
            format!("Database \"{}\" unavailable", self.store.display_name),
            format!(
                "Could not read {}: {}",
                self.store.location.display(),
                self.reason
            ),
        )
    }
}

/// Everything one scan cycle found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Evaluation date.
    #[serde(with = "iso_date")]
    pub today: Date,
    /// Alerts in delivery order.
    pub alerts: Vec<Alert>,
    /// Stores that could not be scanned.
    pub failures: Vec<StoreFailure>,
    /// Number of stores scanned successfully.
    pub scanned: usize,
}

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

impl ScanReport {
    /// Aggregate status: the most severe alert, `Normal` when there are none.
    pub fn status(&self) -> TrayStatus {
        let mut status = TrayStatus::Normal;
        for alert in &self.alerts {
            status.raise(alert.kind().status());
        }
        status
    }

    /// Notifications for this report: alerts first, then failures.
    pub fn notifications(&self) -> Vec<Notification> {
        self.alerts
            .iter()
            .map(Alert::notification)
            .chain(self.failures.iter().map(StoreFailure::notification))
            .collect()
    }

    /// Count of alerts of one kind.
    pub fn count(&self, kind: ExpiryKind) -> usize {
        self.alerts.iter().filter(|a| a.kind() == kind).count()
    }
}

/// Scan one store: upcoming products first, then expired, each in the
/// store's row order.
pub fn scan_store(store: &TrackedStore, window: &ExpiryWindow) -> expiry_store::Result<Vec<Alert>> {
    let products = ProductStore::open_read_only(&store.location)?;
    let upcoming = products.upcoming(window)?;
    let expired = products.expired(window)?;
    debug!(
        "{}: {} upcoming, {} expired",
        store.display_name,
        upcoming.len(),
        expired.len()
    );

    Ok(upcoming
        .into_iter()
        .chain(expired)
        .filter_map(|product| Alert::for_product(&store.display_name, product, window))
        .collect())
}

/// Run one scan cycle over every tracked store.
pub fn scan(stores: &[TrackedStore], window: &ExpiryWindow) -> ScanReport {
    let mut report = ScanReport {
        today: window.today(),
        alerts: Vec::new(),
        failures: Vec::new(),
        scanned: 0,
    };

    for store in stores {
        match scan_store(store, window) {
            Ok(alerts) => {
                report.alerts.extend(alerts);
                report.scanned += 1;
            }
            Err(e) => {
                warn!(
                    "Skipping \"{}\" ({}): {}",
                    store.display_name,
                    store.location.display(),
                    e
                );
                report.failures.push(StoreFailure {
                    store: store.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        "Scanned {} of {} databases on {}: {} upcoming, {} expired",
        report.scanned,
        stores.len(),
        report.today,
        report.count(ExpiryKind::Upcoming),
        report.count(ExpiryKind::Expired)
    );
    report
}
