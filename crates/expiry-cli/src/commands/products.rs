//! Products command implementation.

use anyhow::{Result, bail};
use expiry_core::{Clock, NewProduct, Product, SettingsStore, SystemClock};
use expiry_store::{format_date, parse_date};
use serde::Serialize;
use tabled::builder::Builder;
use time::Date;

use crate::cli::ProductsAction;
use crate::style;
use crate::util::{confirm, open_store, select_store};

#[derive(Debug, Serialize)]
struct ProductListing<'a> {
    database: &'a str,
    products: &'a [Product],
}

pub fn cmd_products(
    settings: &SettingsStore,
    action: ProductsAction,
    quiet: bool,
    no_color: bool,
) -> Result<()> {
    match action {
        ProductsAction::List { db, json } => {
            let tracked = select_store(settings, db.as_deref())?;
            let products = open_store(&tracked)?.list()?;

            if json {
                let listing = ProductListing {
                    database: &tracked.display_name,
                    products: &products,
                };
                println!("{}", serde_json::to_string_pretty(&listing)?);
                return Ok(());
            }

            if products.is_empty() {
                if !quiet {
                    println!("No products in \"{}\".", tracked.display_name);
                    println!();
                    println!("Add one with: expiry products add <NAME> <YYYY-MM-DD>");
                }
                return Ok(());
            }

            if !quiet {
                println!("{}", style::format_title(&tracked.display_name, no_color));
            }
            println!("{}", product_table(&products, SystemClock.today(), no_color));
            Ok(())
        }
        ProductsAction::Add {
            name,
            expiry_date,
            db,
        } => {
            let tracked = select_store(settings, db.as_deref())?;
            let product = NewProduct::new(&name, parse_date(&expiry_date)?)?;
            let added = open_store(&tracked)?.insert(&product)?;
            if !quiet {
                println!(
                    "{}",
                    style::format_success(
                        &format!(
                            "Added \"{}\" (expires {}) to \"{}\" with id {}",
                            added.name,
                            format_date(added.expiry_date),
                            tracked.display_name,
                            added.id
                        ),
                        no_color
                    )
                );
            }
            Ok(())
        }
        ProductsAction::Remove { id, db, yes } => {
            let tracked = select_store(settings, db.as_deref())?;
            let store = open_store(&tracked)?;
            let Some(product) = store.get(id)? else {
                bail!("No product with id {} in \"{}\"", id, tracked.display_name);
            };

            let prompt = format!(
                "Delete \"{}\" (expires {}) from \"{}\"?",
                product.name,
                format_date(product.expiry_date),
                tracked.display_name
            );
            if !confirm(&prompt, false, yes)? {
                bail!("Not deleted. Pass --yes to delete without asking.");
            }
            store.delete(id)?;
            if !quiet {
                println!(
                    "{}",
                    style::format_success(&format!("Deleted \"{}\"", product.name), no_color)
                );
            }
            Ok(())
        }
    }
}

/// Products as a table with days left counted from `today`.
pub fn product_table(products: &[Product], today: Date, no_color: bool) -> tabled::Table {
    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "Expires", "Left"]);
    for product in products {
        let days = (product.expiry_date - today).whole_days();
        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            format_date(product.expiry_date),
            style::format_days_left(days, no_color),
        ]);
    }
    let mut table = builder.build();
    style::apply_table_style(&mut table);
    table
}
