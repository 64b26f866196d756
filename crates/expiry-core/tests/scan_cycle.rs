//! Scan cycle tests against real store files.

use std::path::Path;

use expiry_core::{
    ExpiryKind, ExpiryWindow, NewProduct, NotificationKind, ProductStore, SettingsStore,
    TrackedStore, TrayStatus, scan,
};
use tempfile::TempDir;
use time::Date;
use time::macros::date;

fn make_store(path: &Path, products: &[(&str, Date)]) {
    let store = ProductStore::create(path).unwrap();
    for (name, date) in products {
        store.insert(&NewProduct::new(name, *date).unwrap()).unwrap();
    }
}

#[test]
fn milk_is_upcoming_then_expired() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fridge.db");
    make_store(&path, &[("Milk", date!(2025 - 01 - 10))]);
    let stores = vec![TrackedStore::new("Fridge", &path)];

    let report = scan(&stores, &ExpiryWindow::new(date!(2025 - 01 - 05), 14));
    assert_eq!(report.alerts.len(), 1);
    assert_eq!(report.alerts[0].kind(), ExpiryKind::Upcoming);
    assert_eq!(report.alerts[0].title(), "Upcoming expiry in \"Fridge\"");
    assert_eq!(report.alerts[0].message(), "\"Milk\" is expiring in 6 days.");
    assert_eq!(report.status(), TrayStatus::Warning);

    let report = scan(&stores, &ExpiryWindow::new(date!(2025 - 01 - 12), 14));
    assert_eq!(report.alerts.len(), 1);
    assert_eq!(report.alerts[0].kind(), ExpiryKind::Expired);
    assert_eq!(report.alerts[0].title(), "Expiry in \"Fridge\"");
    assert_eq!(report.alerts[0].message(), "\"Milk\" has now expired");
    assert_eq!(report.status(), TrayStatus::Expired);
}

#[test]
fn rescanning_unchanged_data_is_identical() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lab.db");
    make_store(
        &path,
        &[
            ("Buffer", date!(2025 - 01 - 01)),
            ("Enzyme", date!(2025 - 01 - 08)),
            ("Primer", date!(2025 - 03 - 01)),
        ],
    );
    let stores = vec![TrackedStore::new("Lab", &path)];
    let window = ExpiryWindow::new(date!(2025 - 01 - 05), 14);

    let first = scan(&stores, &window);
    let second = scan(&stores, &window);
    assert_eq!(first, second);
    assert_eq!(first.notifications(), second.notifications());
}

#[test]
fn upcoming_before_expired_within_a_store() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lab.db");
    make_store(
        &path,
        &[
            ("Old", date!(2025 - 01 - 01)),
            ("Soon", date!(2025 - 01 - 07)),
            ("Older", date!(2024 - 12 - 01)),
            ("Sooner", date!(2025 - 01 - 06)),
        ],
    );
    let stores = vec![TrackedStore::new("Lab", &path)];

    let report = scan(&stores, &ExpiryWindow::new(date!(2025 - 01 - 05), 14));
    let names: Vec<_> = report
        .alerts
        .iter()
        .map(|a| a.product.name.as_str())
        .collect();
    assert_eq!(names, vec!["Soon", "Sooner", "Old", "Older"]);
}

#[test]
fn missing_store_is_reported_and_others_still_scanned() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("good.db");
    make_store(&good, &[("Milk", date!(2025 - 01 - 10))]);
    let missing = dir.path().join("missing.db");

    let stores = vec![
        TrackedStore::new("Missing", &missing),
        TrackedStore::new("Good", &good),
    ];
    let report = scan(&stores, &ExpiryWindow::new(date!(2025 - 01 - 05), 14));

    assert_eq!(report.scanned, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].store.display_name, "Missing");
    assert_eq!(report.alerts.len(), 1);
    assert_eq!(report.alerts[0].store, "Good");
    assert!(!missing.exists());

    let kinds: Vec<_> = report.notifications().iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![NotificationKind::Upcoming, NotificationKind::StoreUnavailable]
    );
}

#[test]
fn no_alerts_means_normal_status() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.db");
    make_store(&path, &[("Far away", date!(2030 - 01 - 01))]);
    let stores = vec![TrackedStore::new("Empty", &path)];

    let report = scan(&stores, &ExpiryWindow::new(date!(2025 - 01 - 05), 14));
    assert!(report.alerts.is_empty());
    assert_eq!(report.status(), TrayStatus::Normal);
}

#[test]
fn scans_stores_listed_in_settings() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("pantry.db");
    make_store(&db, &[("Eggs", date!(2025 - 01 - 04))]);

    let settings = SettingsStore::new(dir.path().join("settings.ini"));
    settings
        .add_tracked_store(&TrackedStore::with_default_name(None, &db), |_| true)
        .unwrap();
    settings.set_notify_days(3).unwrap();

    let stores = settings.tracked_stores().unwrap();
    let window = ExpiryWindow::new(
        date!(2025 - 01 - 05),
        settings.scan_settings().unwrap().notify_days,
    );
    let report = scan(&stores, &window);

    assert_eq!(report.alerts[0].store, "pantry.db");
    assert_eq!(report.alerts[0].kind(), ExpiryKind::Expired);
}
