//! Data models for stored products.

use serde::{Deserialize, Serialize};
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::error::{Error, Result};

/// On-disk date format of the `expiry_date` column.
const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// A product row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Database row ID.
    pub id: i64,
    /// Product name.
    pub name: String,
    /// Calendar date the product expires on.
    #[serde(with = "iso_date")]
    pub expiry_date: Date,
}

/// A product that has not been inserted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    name: String,
    expiry_date: Date,
}

impl NewProduct {
    /// Validate and build a new product. The name is trimmed.
    pub fn new(name: &str, expiry_date: Date) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidName);
        }
        Ok(Self {
            name: name.to_string(),
            expiry_date,
        })
    }

    /// Trimmed product name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Expiry date.
    pub fn expiry_date(&self) -> Date {
        self.expiry_date
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<Date> {
    Date::parse(s.trim(), DATE_FORMAT).map_err(|_| Error::InvalidDate(s.to_string()))
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    // The format has no fallible components for in-range dates.
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}
