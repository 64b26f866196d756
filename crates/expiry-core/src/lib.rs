//! Scan, notify, and pause logic for expiry-watch.
//!
//! This crate sits between the product stores ([`expiry_store`]) and the
//! `expiry` binary. It owns:
//!
//! - [`settings`]: the INI settings file listing tracked stores and scan
//!   settings
//! - [`scan`]: one scan cycle over every tracked store
//! - [`notifier`]: the notification contract and the tray status
//! - [`pause`]: the 24 hour notification pause
//! - [`controller`]: the task that schedules scans and owns the state
//!
//! # Example
//!
//! ```no_run
//! use expiry_core::{ExpiryWindow, SettingsStore, scan};
//! use time::macros::date;
//!
//! let settings = SettingsStore::open_default();
//! let stores = settings.tracked_stores()?;
//! let window = ExpiryWindow::new(date!(2025 - 01 - 05), settings.scan_settings()?.notify_days);
//!
//! let report = scan(&stores, &window);
//! for alert in &report.alerts {
//!     println!("{}: {}", alert.title(), alert.message());
//! }
//! # Ok::<(), expiry_core::Error>(())
//! ```

pub mod clock;
pub mod controller;
pub mod error;
pub mod interval;
pub mod notifier;
pub mod pause;
pub mod scan;
pub mod settings;

pub use clock::{Clock, FixedClock, SystemClock};
pub use controller::{AppSnapshot, Command, Controller, ControllerHandle, Launcher, ReportSummary};
pub use error::{Error, Result};
pub use interval::{INTERVAL_PRESETS, interval_label, parse_interval};
pub use notifier::{
    APP_NAME, LogNotifier, Notification, NotificationKind, Notifier, RecordingNotifier, TrayStatus,
    dispatch,
};
pub use pause::{PAUSE_DURATION, PauseController, PauseState};
pub use scan::{Alert, AlertState, ExpiryKind, ScanReport, StoreFailure, scan, scan_store};
pub use settings::{AddOutcome, ScanSettings, SettingsStore, TrackedStore, default_settings_path};

// Re-export the store types callers need alongside the scan API.
pub use expiry_store::{ExpiryWindow, NewProduct, Product, ProductStore};
