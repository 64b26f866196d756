//! Config command implementation.

use anyhow::Result;
use expiry_core::{SettingsStore, interval_label, parse_interval};
use serde::Serialize;

use crate::cli::ConfigAction;
use crate::style;

#[derive(Debug, Serialize)]
struct ConfigView {
    path: String,
    scan_interval_secs: u64,
    scan_interval: String,
    notify_days: u32,
    databases: Vec<expiry_core::TrackedStore>,
}

pub fn cmd_config(settings: &SettingsStore, action: ConfigAction, quiet: bool, no_color: bool) -> Result<()> {
    match action {
        ConfigAction::Show { json } => {
            let scan = settings.scan_settings()?;
            let view = ConfigView {
                path: settings.path().display().to_string(),
                scan_interval_secs: scan.scan_interval_secs,
                scan_interval: interval_label(scan.scan_interval_secs),
                notify_days: scan.notify_days,
                databases: settings.tracked_stores()?,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
                return Ok(());
            }

            println!("Settings file: {}", view.path);
            if !settings.exists() {
                println!("  (not created yet, showing defaults)");
            }
            println!();
            println!("scan_interval = {} ({})", view.scan_interval_secs, view.scan_interval);
            println!("notify_days   = {}", view.notify_days);
            println!();
            if view.databases.is_empty() {
                println!("No databases are tracked yet.");
            } else {
                println!("Databases:");
                for store in &view.databases {
                    println!("  {} = {}", store.display_name, store.location.display());
                }
            }
        }
        ConfigAction::Path => {
            println!("{}", settings.path().display());
        }
        ConfigAction::SetInterval { interval } => {
            let secs = parse_interval(&interval)?;
            settings.set_scan_interval(secs)?;
            if !quiet {
                println!(
                    "{}",
                    style::format_success(
                        &format!("Scan interval set to {}", interval_label(secs)),
                        no_color
                    )
                );
            }
        }
        ConfigAction::SetNotifyDays { days } => {
            settings.set_notify_days(days)?;
            if !quiet {
                println!(
                    "{}",
                    style::format_success(
                        &format!("Notifying {} day(s) ahead", days),
                        no_color
                    )
                );
            }
        }
    }

    Ok(())
}
