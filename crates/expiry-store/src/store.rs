//! Main store implementation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{NewProduct, Product, parse_date};
use crate::queries::{ExpiryWindow, SELECT_ALL, SELECT_EXPIRED, SELECT_UPCOMING};
use crate::schema;

/// How long to wait on a store another process holds locked.
const BUSY_TIMEOUT: Duration = Duration::from_secs(2);

/// One open product store file.
///
/// The connection closes when the store is dropped. Callers are expected to
/// open a store, run one batch of statements, and drop it.
pub struct ProductStore {
    conn: Connection,
    path: PathBuf,
}

impl std::fmt::Debug for ProductStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl ProductStore {
    /// Create a new, empty store file.
    ///
    /// Refuses to touch an existing file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Err(Error::AlreadyExists(path.to_path_buf()));
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        info!("Creating product store at {}", path.display());
        let conn = Connection::open(path)?;
        schema::create(&conn)?;

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Open an existing store for reading and writing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path.as_ref(), OpenFlags::SQLITE_OPEN_READ_WRITE)
    }

    /// Open an existing store read-only. Used by scans.
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path.as_ref(), OpenFlags::SQLITE_OPEN_READ_ONLY)
    }

    fn open_with(path: &Path, mode: OpenFlags) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::StoreNotFound(path.to_path_buf()));
        }

        debug!("Opening product store at {}", path.display());
        let flags = mode | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        if !schema::has_products_table(&conn)? {
            return Err(Error::MissingProductsTable(path.to_path_buf()));
        }

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::create(&conn)?;
        Ok(Self {
            conn,
            path: PathBuf::from(":memory:"),
        })
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

// Scan queries
impl ProductStore {
    /// Products expiring within the window, in native row order.
    pub fn upcoming(&self, window: &ExpiryWindow) -> Result<Vec<Product>> {
        let (start, end) = window.upcoming_range();
        debug!("Executing query: {} [{}, {}]", SELECT_UPCOMING, start, end);
        self.collect(SELECT_UPCOMING, rusqlite::params![start, end])
    }

    /// Products that expired before the evaluation date, in native row order.
    pub fn expired(&self, window: &ExpiryWindow) -> Result<Vec<Product>> {
        let Some(cutoff) = window.expired_cutoff() else {
            return Ok(Vec::new());
        };
        debug!("Executing query: {} [{}]", SELECT_EXPIRED, cutoff);
        self.collect(SELECT_EXPIRED, rusqlite::params![cutoff])
    }

    fn collect(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<Product>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, raw_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .filter_map(|raw| raw.into_product(&self.path))
            .collect())
    }
}

// Editor operations
impl ProductStore {
    /// All products, in native row order.
    pub fn list(&self) -> Result<Vec<Product>> {
        self.collect(SELECT_ALL, [])
    }

    /// Fetch one product by id.
    pub fn get(&self, id: i64) -> Result<Option<Product>> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, name, expiry_date FROM products WHERE id = ?1",
                [id],
                raw_row,
            )
            .optional()?;
        Ok(raw.and_then(|raw| raw.into_product(&self.path)))
    }

    /// Insert a product and return it with its generated id.
    pub fn insert(&self, product: &NewProduct) -> Result<Product> {
        self.conn.execute(
            "INSERT INTO products (name, expiry_date) VALUES (?1, ?2)",
            rusqlite::params![product.name(), product.expiry_date()],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(
            "Added '{}' (expires {}) to {}",
            product.name(),
            product.expiry_date(),
            self.path.display()
        );

        Ok(Product {
            id,
            name: product.name().to_string(),
            expiry_date: product.expiry_date(),
        })
    }

    /// Delete a product by id.
    pub fn delete(&self, id: i64) -> Result<()> {
        let affected = self
            .conn
            .execute("DELETE FROM products WHERE id = ?1", [id])?;
        if affected == 0 {
            return Err(Error::ProductNotFound(id));
        }
        info!("Removed product {} from {}", id, self.path.display());
        Ok(())
    }

    /// Number of rows in the store.
    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

/// A row as stored, before the date is validated.
///
/// The `DATE` column has numeric affinity, so hand-entered values such as
/// `20250101` come back as integers rather than text.
struct RawProduct {
    id: i64,
    name: String,
    expiry_date: Value,
}

impl RawProduct {
    fn into_product(self, path: &Path) -> Option<Product> {
        let parsed = match &self.expiry_date {
            Value::Text(text) => parse_date(text).ok(),
            _ => None,
        };
        match parsed {
            Some(expiry_date) => Some(Product {
                id: self.id,
                name: self.name,
                expiry_date,
            }),
            None => {
                warn!(
                    "Skipping product {} ('{}') in {}: unreadable expiry date {:?}",
                    self.id,
                    self.name,
                    path.display(),
                    self.expiry_date
                );
                None
            }
        }
    }
}

fn raw_row(row: &Row<'_>) -> rusqlite::Result<RawProduct> {
    Ok(RawProduct {
        id: row.get(0)?,
        name: row.get(1)?,
        expiry_date: row.get(2)?,
    })
}
