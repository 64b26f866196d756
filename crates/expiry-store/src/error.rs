//! Error types for expiry-store.

use std::path::PathBuf;

/// Result type for expiry-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in expiry-store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Database error from SQLite.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The store file does not exist.
    #[error("Product store not found: {}", .0.display())]
    StoreNotFound(PathBuf),

    /// Refused to create a store over an existing file.
    #[error("A file already exists at {}", .0.display())]
    AlreadyExists(PathBuf),

    /// The file opened but holds no `products` table.
    #[error("{} is not a product store (no products table)", .0.display())]
    MissingProductsTable(PathBuf),

    /// Failed to create the directory for a new store.
    #[error("Failed to create directory {}: {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Product names must contain at least one non-whitespace character.
    #[error("Product name must not be empty")]
    InvalidName,

    /// A date that is not `YYYY-MM-DD`.
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// No product with this id.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
