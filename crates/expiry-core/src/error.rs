//! Error types for expiry-core.
//!
//! # Handling
//!
//! | Error | Handling |
//! |-------|----------|
//! | [`Error::ConfigRead`] | Fatal. The settings file exists but cannot be read or parsed. |
//! | [`Error::ConfigWrite`] | Report to the user; settings are unchanged. |
//! | [`Error::DuplicateLocation`] | Rejected outright; the store is already tracked. |
//! | [`Error::UnknownStore`] | Report to the user. |
//! | [`Error::InvalidSetting`] | Report to the user; settings are unchanged. |
//! | [`Error::NoStoreSelected`] | Fatal at first run, otherwise informational. |
//! | [`Error::Store`] | During a scan: skip that store and continue. |
//!
//! Nothing is retried.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for expiry-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the settings store, the scanner, and the controller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The settings file exists but could not be read or parsed.
    #[error("Settings read error in {}: {reason}", path.display())]
    ConfigRead {
        /// The settings file.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// The settings file could not be written.
    #[error("Failed to write settings to {}: {source}", path.display())]
    ConfigWrite {
        /// The settings file.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The location is already tracked, possibly under another name.
    #[error("This database is already tracked under the name \"{existing_name}\"")]
    DuplicateLocation {
        /// Name the location is tracked under.
        existing_name: String,
    },

    /// No tracked store with this display name.
    #[error("No tracked database named \"{0}\"")]
    UnknownStore(String),

    /// A setting value was rejected.
    #[error("Invalid value for {key}: {reason}")]
    InvalidSetting {
        /// Settings key.
        key: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The user dismissed onboarding without choosing a database.
    #[error("No database selected")]
    NoStoreSelected,

    /// Product store failure.
    #[error(transparent)]
    Store(#[from] expiry_store::Error),
}
