//! Scan command implementation.

use anyhow::{Context, Result};
use expiry_core::{Clock, ExpiryWindow, SettingsStore, SystemClock, scan};

use crate::style;

pub fn cmd_scan(settings: &SettingsStore, json: bool, quiet: bool, no_color: bool) -> Result<()> {
    let stores = settings
        .tracked_stores()
        .context("Failed to load tracked databases")?;
    let scan_settings = settings.scan_settings()?;
    let window = ExpiryWindow::new(SystemClock.today(), scan_settings.notify_days);

    let spinner =
        (!json && !quiet && !stores.is_empty()).then(|| style::scanning_spinner(stores.len()));
    let report = scan(&stores, &window);
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if stores.is_empty() {
        if !quiet {
            println!("No databases are tracked yet.");
            println!();
            println!("Add one with: expiry db create <PATH> or expiry db add <PATH>");
        }
        return Ok(());
    }

    for alert in &report.alerts {
        println!("{}", style::format_alert(alert, no_color));
    }
    for failure in &report.failures {
        println!("{}", style::format_failure(failure, no_color));
    }

    if !quiet {
        if !report.alerts.is_empty() || !report.failures.is_empty() {
            println!();
        }
        let summary = format!(
            "Scanned {} of {} database(s): {} upcoming within {} days, {} expired",
            report.scanned,
            stores.len(),
            report.count(expiry_core::ExpiryKind::Upcoming),
            window.notify_days(),
            report.count(expiry_core::ExpiryKind::Expired)
        );
        if report.failures.is_empty() {
            println!("{}", style::format_success(&summary, no_color));
        } else {
            println!("{}", style::format_warning(&summary, no_color));
        }
    }
    Ok(())
}
