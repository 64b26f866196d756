//! Product store schema.
//!
//! The layout is fixed: stores created by earlier releases and stores
//! created by hand share it, so opening a store never alters its schema.

use rusqlite::Connection;

use crate::error::Result;

/// Create the `products` table if it does not exist.
pub fn create(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            expiry_date DATE NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Check whether the `products` table exists.
pub fn has_products_table(conn: &Connection) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='products'",
        [],
        |row| row.get(0),
    )?;
    Ok(exists)
}
