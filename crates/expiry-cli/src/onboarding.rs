//! First-run onboarding and the interactive "add database" flow.
//!
//! Loading settings never prompts. Commands that need at least one tracked
//! database call [`ensure_tracked_stores`], which walks the user through
//! creating or loading one when nothing is configured yet.

use std::path::PathBuf;

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use expiry_core::{AddOutcome, Error as CoreError, ProductStore, SettingsStore, TrackedStore};
use tracing::info;

use crate::style;
use crate::util::{absolute_path, confirm, is_interactive};

/// Track `store`, asking before overwriting an entry with the same name.
pub fn track_store(settings: &SettingsStore, store: &TrackedStore, assume_yes: bool) -> Result<AddOutcome> {
    let outcome = settings.add_tracked_store(store, |existing| {
        let prompt = format!(
            "A database named \"{}\" already exists at {}. Overwrite it?",
            existing.display_name,
            existing.location.display()
        );
        confirm(&prompt, false, assume_yes).unwrap_or(false)
    })?;
    Ok(outcome)
}

/// Print what [`track_store`] did.
pub fn report_outcome(store: &TrackedStore, outcome: AddOutcome, no_color: bool) {
    let message = match outcome {
        AddOutcome::Added => format!(
            "Tracking \"{}\" at {}",
            store.display_name,
            store.location.display()
        ),
        AddOutcome::Replaced => format!(
            "Updated \"{}\" to {}",
            store.display_name,
            store.location.display()
        ),
        AddOutcome::Declined => {
            println!(
                "{}",
                style::format_info(
                    &format!("Kept the existing \"{}\"", store.display_name),
                    no_color
                )
            );
            return;
        }
    };
    println!("{}", style::format_success(&message, no_color));
}

/// Tracked stores, running onboarding first when there are none.
///
/// Fails with "No database selected" when nothing is configured and the
/// session is not interactive or the user backs out.
pub fn ensure_tracked_stores(settings: &SettingsStore, no_color: bool) -> Result<Vec<TrackedStore>> {
    let stores = settings.tracked_stores()?;
    if !stores.is_empty() {
        return Ok(stores);
    }
    if !is_interactive() {
        return Err(CoreError::NoStoreSelected.into());
    }

    eprintln!(
        "{}",
        style::format_title("No databases are tracked yet", no_color)
    );
    loop {
        if prompt_add_store(settings, no_color)?.is_none() {
            break;
        }
        let more = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Add another database?")
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if !more {
            break;
        }
    }

    let stores = settings.tracked_stores()?;
    if stores.is_empty() {
        return Err(CoreError::NoStoreSelected.into());
    }
    info!("Onboarding finished with {} database(s)", stores.len());
    Ok(stores)
}

/// Ask the user to create or load a database and track it.
///
/// Returns `None` when the user cancels.
pub fn prompt_add_store(settings: &SettingsStore, no_color: bool) -> Result<Option<TrackedStore>> {
    let theme = ColorfulTheme::default();
    let choice = Select::with_theme(&theme)
        .with_prompt("Add a database")
        .items(&["Create a new database", "Load an existing database", "Cancel"])
        .default(0)
        .interact()
        .context("Failed to get user selection")?;

    let create = match choice {
        0 => true,
        1 => false,
        _ => return Ok(None),
    };

    let default_path = default_store_path();
    let raw: String = Input::with_theme(&theme)
        .with_prompt(if create {
            "Path for the new database"
        } else {
            "Path of the existing database"
        })
        .default(default_path.display().to_string())
        .interact_text()
        .context("Failed to read path")?;
    let location = absolute_path(&PathBuf::from(raw.trim()))?;

    if create {
        ProductStore::create(&location)
            .with_context(|| format!("Failed to create {}", location.display()))?;
    } else {
        ProductStore::open_read_only(&location)
            .with_context(|| format!("Failed to load {}", location.display()))?;
    }

    let default_name = expiry_core::settings::default_display_name(&location);
    let name: String = Input::with_theme(&theme)
        .with_prompt("Display name")
        .default(default_name)
        .interact_text()
        .context("Failed to read display name")?;
    let store = TrackedStore::with_default_name(Some(&name), location);

    match track_store(settings, &store, false) {
        Ok(outcome) => {
            report_outcome(&store, outcome, no_color);
            Ok((outcome != AddOutcome::Declined).then_some(store))
        }
        Err(e) => {
            eprintln!("{}", style::format_warning(&e.to_string(), no_color));
            Ok(None)
        }
    }
}

/// Suggested location for a first database.
fn default_store_path() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(format!("products.{}", expiry_store::STORE_EXTENSION))
}
