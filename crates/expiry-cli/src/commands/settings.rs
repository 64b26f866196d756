//! Interactive settings editor.

use anyhow::{Context, Result, bail};
use dialoguer::{Input, Select, theme::ColorfulTheme};
use expiry_core::{INTERVAL_PRESETS, SettingsStore, interval_label, parse_interval};

use crate::onboarding::prompt_add_store;
use crate::style;
use crate::util::{confirm, is_interactive};

pub fn cmd_settings(settings: &SettingsStore, no_color: bool) -> Result<()> {
    if !is_interactive() {
        bail!(
            "The settings editor needs an interactive terminal.\n\
             Use `expiry db` and `expiry config` from scripts."
        );
    }

    let theme = ColorfulTheme::default();
    loop {
        let scan = settings.scan_settings()?;
        let stores = settings.tracked_stores()?;
        let items = [
            format!("Tracked databases ({})", stores.len()),
            "Add a database".to_string(),
            "Remove a database".to_string(),
            format!("Scan interval: {}", interval_label(scan.scan_interval_secs)),
            format!("Notify window: {} day(s)", scan.notify_days),
            "Done".to_string(),
        ];
        let choice = Select::with_theme(&theme)
            .with_prompt("Settings")
            .items(&items)
            .default(0)
            .interact()
            .context("Failed to get user selection")?;

        let result = match choice {
            0 => {
                if stores.is_empty() {
                    println!("{}", style::format_info("No databases are tracked yet", no_color));
                }
                for store in &stores {
                    println!("  {} = {}", store.display_name, store.location.display());
                }
                Ok(())
            }
            1 => prompt_add_store(settings, no_color).map(|_| ()),
            2 => remove(settings, no_color),
            3 => choose_interval(settings, scan.scan_interval_secs, no_color),
            4 => choose_notify_days(settings, scan.notify_days, no_color),
            _ => return Ok(()),
        };

        if let Err(e) = result {
            eprintln!("{}", style::format_warning(&format!("{:#}", e), no_color));
        }
    }
}

fn remove(settings: &SettingsStore, no_color: bool) -> Result<()> {
    let stores = settings.tracked_stores()?;
    if stores.is_empty() {
        println!("{}", style::format_info("Nothing to remove", no_color));
        return Ok(());
    }

    let mut items: Vec<String> = stores
        .iter()
        .map(|s| format!("{} ({})", s.display_name, s.location.display()))
        .collect();
    items.push("Cancel".to_string());
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Stop tracking which database?")
        .items(&items)
        .default(0)
        .interact()
        .context("Failed to get user selection")?;
    let Some(store) = stores.get(selection) else {
        return Ok(());
    };

    let prompt = format!(
        "Stop tracking \"{}\"? The file itself is kept.",
        store.display_name
    );
    if confirm(&prompt, false, false)? {
        settings.remove_tracked_store(&store.display_name)?;
        println!(
            "{}",
            style::format_success(
                &format!("Stopped tracking \"{}\"", store.display_name),
                no_color
            )
        );
    }
    Ok(())
}

fn choose_interval(settings: &SettingsStore, current: u64, no_color: bool) -> Result<()> {
    let mut items: Vec<String> = INTERVAL_PRESETS
        .iter()
        .map(|(_, label)| label.to_string())
        .collect();
    items.push("Custom...".to_string());
    let default = INTERVAL_PRESETS
        .iter()
        .position(|(secs, _)| *secs == current)
        .unwrap_or(items.len() - 1);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Scan every")
        .items(&items)
        .default(default)
        .interact()
        .context("Failed to get user selection")?;

    let secs = match INTERVAL_PRESETS.get(selection) {
        Some((secs, _)) => *secs,
        None => {
            let raw: String = Input::with_theme(&ColorfulTheme::default())
                .with_prompt("Interval (seconds, or e.g. 90m, 5h)")
                .default(current.to_string())
                .validate_with(|input: &String| -> Result<(), String> {
                    parse_interval(input).map(|_| ()).map_err(|e| e.to_string())
                })
                .interact_text()
                .context("Failed to read interval")?;
            parse_interval(&raw)?
        }
    };

    settings.set_scan_interval(secs)?;
    println!(
        "{}",
        style::format_success(
            &format!("Scan interval set to {}", interval_label(secs)),
            no_color
        )
    );
    Ok(())
}

fn choose_notify_days(settings: &SettingsStore, current: u32, no_color: bool) -> Result<()> {
    let days: u32 = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("Notify how many days ahead?")
        .default(current)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if *input == 0 {
                Err("Must be at least 1")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .context("Failed to read number of days")?;

    settings.set_notify_days(days)?;
    println!(
        "{}",
        style::format_success(&format!("Notifying {} day(s) ahead", days), no_color)
    );
    Ok(())
}
