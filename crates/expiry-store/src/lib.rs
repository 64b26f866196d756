//! SQLite product stores for expiry-watch.
//!
//! A product store is a single SQLite file holding one `products` table of
//! `(id, name, expiry_date)` rows. Every tracked store is its own file, so
//! this crate never pools connections: each [`ProductStore`] owns exactly one
//! connection and callers open, query, and drop it within a single batch.
//!
//! # Example
//!
//! ```no_run
//! use expiry_store::{ExpiryWindow, ProductStore};
//! use time::macros::date;
//!
//! let store = ProductStore::open_read_only("reagents.db")?;
//! let window = ExpiryWindow::new(date!(2025 - 01 - 05), 14);
//!
//! for product in store.upcoming(&window)? {
//!     println!("{} expires on {}", product.name, product.expiry_date);
//! }
//! # Ok::<(), expiry_store::Error>(())
//! ```

mod error;
mod models;
mod queries;
mod schema;
mod store;

pub use error::{Error, Result};
pub use models::{NewProduct, Product, format_date, parse_date};
pub use queries::ExpiryWindow;
pub use store::ProductStore;

/// File extension used for product stores created by expiry-watch.
pub const STORE_EXTENSION: &str = "db";
