//! Utility functions for CLI operations.

use std::io::{self, IsTerminal};
use std::path::Path;

use anyhow::{Context, Result, bail};
use dialoguer::{Confirm, theme::ColorfulTheme};
use expiry_core::{ProductStore, SettingsStore, TrackedStore};

/// Whether stdin and stderr are both attached to a terminal.
pub fn is_interactive() -> bool {
    io::stdin().is_terminal() && io::stderr().is_terminal()
}

/// Ask a yes/no question. `assume_yes` answers without prompting.
///
/// Non-interactive sessions answer `default` so scripts never hang.
pub fn confirm(prompt: &str, default: bool, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    if !is_interactive() {
        return Ok(default);
    }
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(default)
        .interact()
        .context("Failed to read confirmation")
}

/// Find a tracked store by name, or the first one when no name is given.
pub fn select_store(settings: &SettingsStore, name: Option<&str>) -> Result<TrackedStore> {
    let stores = settings
        .tracked_stores()
        .context("Failed to load tracked databases")?;

    match name {
        Some(name) => stores
            .into_iter()
            .find(|s| s.display_name == name)
            .with_context(|| format!("No tracked database named \"{}\"", name)),
        None => match stores.into_iter().next() {
            Some(store) => Ok(store),
            None => bail!(
                "No databases are tracked yet.\n\
                 Add one with: expiry db create <PATH> or expiry db add <PATH>"
            ),
        },
    }
}

/// Open a tracked store for editing.
pub fn open_store(store: &TrackedStore) -> Result<ProductStore> {
    ProductStore::open(&store.location).with_context(|| {
        format!(
            "Failed to open \"{}\" at {}",
            store.display_name,
            store.location.display()
        )
    })
}

/// Absolute form of a user-supplied path, so the settings file does not
/// depend on the current directory.
pub fn absolute_path(path: &Path) -> Result<std::path::PathBuf> {
    std::path::absolute(path).with_context(|| format!("Invalid path {}", path.display()))
}
