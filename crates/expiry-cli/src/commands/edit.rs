//! Interactive product editor.

use anyhow::{Context, Result, bail};
use dialoguer::{Input, Select, theme::ColorfulTheme};
use expiry_core::{Clock, NewProduct, SettingsStore, SystemClock, TrackedStore};
use expiry_store::{format_date, parse_date};

use super::products::product_table;
use crate::onboarding::ensure_tracked_stores;
use crate::style;
use crate::util::{confirm, is_interactive, open_store};

const ACTIONS: &[&str] = &[
    "List products",
    "Add a product",
    "Delete a product",
    "Switch database",
    "Quit",
];

pub fn cmd_edit(settings: &SettingsStore, no_color: bool) -> Result<()> {
    if !is_interactive() {
        bail!(
            "The editor needs an interactive terminal.\n\
             Use `expiry products list|add|remove` from scripts."
        );
    }

    let mut stores = ensure_tracked_stores(settings, no_color)?;
    let mut current = choose_store(&stores)?;
    let theme = ColorfulTheme::default();

    loop {
        let prompt = format!("Editing \"{}\"", current.display_name);
        let action = Select::with_theme(&theme)
            .with_prompt(&prompt)
            .items(ACTIONS)
            .default(0)
            .interact()
            .context("Failed to get user selection")?;

        let result = match action {
            0 => list(&current, no_color),
            1 => add(&current, no_color),
            2 => delete(&current, no_color),
            3 => {
                stores = settings.tracked_stores()?;
                if stores.is_empty() {
                    bail!("No databases are tracked any more");
                }
                current = choose_store(&stores)?;
                Ok(())
            }
            _ => return Ok(()),
        };

        // Store errors are shown and the editor keeps running.
        if let Err(e) = result {
            eprintln!("{}", style::format_warning(&format!("{:#}", e), no_color));
        }
    }
}

fn choose_store(stores: &[TrackedStore]) -> Result<TrackedStore> {
    if let [only] = stores {
        return Ok(only.clone());
    }
    let items: Vec<String> = stores
        .iter()
        .map(|s| format!("{} ({})", s.display_name, s.location.display()))
        .collect();
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select a database")
        .items(&items)
        .default(0)
        .interact()
        .context("Failed to get user selection")?;
    Ok(stores[selection].clone())
}

fn list(store: &TrackedStore, no_color: bool) -> Result<()> {
    let products = open_store(store)?.list()?;
    if products.is_empty() {
        println!("{}", style::format_info("No products yet", no_color));
    } else {
        println!("{}", product_table(&products, SystemClock.today(), no_color));
    }
    Ok(())
}

fn add(store: &TrackedStore, no_color: bool) -> Result<()> {
    let theme = ColorfulTheme::default();
    let name: String = Input::with_theme(&theme)
        .with_prompt("Product name")
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                Err("The name must not be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .context("Failed to read product name")?;

    let date: String = Input::with_theme(&theme)
        .with_prompt("Expiry date (YYYY-MM-DD)")
        .validate_with(|input: &String| -> Result<(), String> {
            parse_date(input.trim()).map(|_| ()).map_err(|e| e.to_string())
        })
        .interact_text()
        .context("Failed to read expiry date")?;

    let product = NewProduct::new(&name, parse_date(date.trim())?)?;
    let added = open_store(store)?.insert(&product)?;
    println!(
        "{}",
        style::format_success(
            &format!(
                "Added \"{}\" (expires {})",
                added.name,
                format_date(added.expiry_date)
            ),
            no_color
        )
    );
    Ok(())
}

fn delete(store: &TrackedStore, no_color: bool) -> Result<()> {
    let products_store = open_store(store)?;
    let products = products_store.list()?;
    if products.is_empty() {
        println!("{}", style::format_info("Nothing to delete", no_color));
        return Ok(());
    }

    let mut items: Vec<String> = products
        .iter()
        .map(|p| format!("{} (expires {})", p.name, format_date(p.expiry_date)))
        .collect();
    items.push("Cancel".to_string());

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Delete which product?")
        .items(&items)
        .default(0)
        .interact()
        .context("Failed to get user selection")?;
    let Some(product) = products.get(selection) else {
        return Ok(());
    };

    let prompt = format!("Delete \"{}\"? This cannot be undone.", product.name);
    if confirm(&prompt, false, false)? {
        products_store.delete(product.id)?;
        println!(
            "{}",
            style::format_success(&format!("Deleted \"{}\"", product.name), no_color)
        );
    }
    Ok(())
}
