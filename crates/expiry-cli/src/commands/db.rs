//! Db command implementation.
//!
//! Manages the tracked databases listed in the settings file.

use anyhow::{Context, Result, bail};
use expiry_core::{AddOutcome, ProductStore, SettingsStore, TrackedStore};
use serde::Serialize;
use tabled::builder::Builder;

use crate::cli::DbAction;
use crate::onboarding::{report_outcome, track_store};
use crate::style;
use crate::util::{absolute_path, confirm};

#[derive(Debug, Serialize)]
struct DbListing {
    name: String,
    location: String,
    products: Option<u64>,
    error: Option<String>,
}

pub fn cmd_db(settings: &SettingsStore, action: DbAction, quiet: bool, no_color: bool) -> Result<()> {
    match action {
        DbAction::List { json } => list(settings, json, quiet),
        DbAction::Create { path, name, yes } => {
            let location = absolute_path(&path)?;
            ProductStore::create(&location)
                .with_context(|| format!("Failed to create {}", location.display()))?;
            if !quiet {
                println!(
                    "{}",
                    style::format_success(&format!("Created {}", location.display()), no_color)
                );
            }
            let store = TrackedStore::with_default_name(name.as_deref(), location);
            let outcome = track_store(settings, &store, yes)?;
            if !quiet || outcome == AddOutcome::Declined {
                report_outcome(&store, outcome, no_color);
            }
            Ok(())
        }
        DbAction::Add { path, name, yes } => {
            let location = absolute_path(&path)?;
            ProductStore::open_read_only(&location)
                .with_context(|| format!("Failed to load {}", location.display()))?;
            let store = TrackedStore::with_default_name(name.as_deref(), location);
            let outcome = track_store(settings, &store, yes)?;
            if !quiet || outcome == AddOutcome::Declined {
                report_outcome(&store, outcome, no_color);
            }
            Ok(())
        }
        DbAction::Remove { name, yes } => {
            let prompt = format!("Stop tracking \"{}\"? The file itself is kept.", name);
            if !confirm(&prompt, false, yes)? {
                bail!("Not removed. Pass --yes to remove without asking.");
            }
            let removed = settings.remove_tracked_store(&name)?;
            if !quiet {
                println!(
                    "{}",
                    style::format_success(
                        &format!(
                            "Stopped tracking \"{}\" ({})",
                            removed.display_name,
                            removed.location.display()
                        ),
                        no_color
                    )
                );
            }
            Ok(())
        }
    }
}

fn list(settings: &SettingsStore, json: bool, quiet: bool) -> Result<()> {
    let stores = settings.tracked_stores()?;
    let listings: Vec<DbListing> = stores.iter().map(describe).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&listings)?);
        return Ok(());
    }

    if listings.is_empty() {
        if !quiet {
            println!("No databases are tracked yet.");
            println!();
            println!("Create one with: expiry db create <PATH>");
            println!("Or track an existing one with: expiry db add <PATH>");
        }
        return Ok(());
    }

    let mut builder = Builder::default();
    builder.push_record(["Name", "Location", "Products"]);
    for listing in &listings {
        let products = match (&listing.products, &listing.error) {
            (Some(count), _) => count.to_string(),
            (None, Some(error)) => format!("unavailable: {}", error),
            (None, None) => "-".to_string(),
        };
        builder.push_record([listing.name.clone(), listing.location.clone(), products]);
    }

    let mut table = builder.build();
    style::apply_table_style(&mut table);
    println!("{}", table);
    Ok(())
}

fn describe(store: &TrackedStore) -> DbListing {
    let counted = ProductStore::open_read_only(&store.location).and_then(|s| s.count());
    let (products, error) = match counted {
        Ok(count) => (Some(count), None),
        Err(e) => (None, Some(e.to_string())),
    };
    DbListing {
        name: store.display_name.clone(),
        location: store.location.display().to_string(),
        products,
        error,
    }
}
