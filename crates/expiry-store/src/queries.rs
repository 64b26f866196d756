//! Date-range queries over the `products` table.
//!
//! An [`ExpiryWindow`] fixes an evaluation date and a notify window and
//! derives the two ranges the scanner asks for:
//!
//! - upcoming: `today <= expiry_date <= today + notify_days`
//! - expired: `expiry_date <= today - 1 day`
//!
//! The ranges never overlap, so a product is in at most one of them for a
//! given evaluation date.
//!
//! # Example
//!
//! ```
//! use expiry_store::ExpiryWindow;
//! use time::macros::date;
//!
//! let window = ExpiryWindow::new(date!(2025 - 01 - 05), 14);
//! assert!(window.is_upcoming(date!(2025 - 01 - 10)));
//! assert!(window.is_expired(date!(2025 - 01 - 04)));
//! assert!(!window.is_upcoming(date!(2025 - 01 - 20)));
//! ```

use time::{Date, Duration};

pub(crate) const SELECT_UPCOMING: &str = "SELECT id, name, expiry_date FROM products \
     WHERE expiry_date >= ?1 AND expiry_date <= ?2";

pub(crate) const SELECT_EXPIRED: &str =
    "SELECT id, name, expiry_date FROM products WHERE expiry_date <= ?1";

pub(crate) const SELECT_ALL: &str = "SELECT id, name, expiry_date FROM products";

/// Evaluation date plus notify window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryWindow {
    today: Date,
    notify_days: u32,
}

impl ExpiryWindow {
    /// Create a window evaluated on `today`, looking `notify_days` ahead.
    pub fn new(today: Date, notify_days: u32) -> Self {
        Self { today, notify_days }
    }

    /// The evaluation date.
    pub fn today(&self) -> Date {
        self.today
    }

    /// Days ahead of today that still count as upcoming.
    pub fn notify_days(&self) -> u32 {
        self.notify_days
    }

    /// Inclusive bounds of the upcoming range.
    pub fn upcoming_range(&self) -> (Date, Date) {
        let end = self
            .today
            .checked_add(Duration::days(i64::from(self.notify_days)))
            .unwrap_or(Date::MAX);
        (self.today, end)
    }

    /// Latest date that counts as expired (yesterday).
    ///
    /// `None` only when today is the first representable date.
    pub fn expired_cutoff(&self) -> Option<Date> {
        self.today.previous_day()
    }

    /// Whether `expiry_date` falls in the upcoming range.
    pub fn is_upcoming(&self, expiry_date: Date) -> bool {
        let (start, end) = self.upcoming_range();
        start <= expiry_date && expiry_date <= end
    }

    /// Whether `expiry_date` is already past.
    pub fn is_expired(&self, expiry_date: Date) -> bool {
        self.expired_cutoff()
            .is_some_and(|cutoff| expiry_date <= cutoff)
    }

    /// Days left as shown to the user: the calendar distance plus one, so
    /// an item expiring today reads "1 day".
    pub fn days_remaining(&self, expiry_date: Date) -> i64 {
        (expiry_date - self.today).whole_days() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_upcoming_range_inclusive() {
        let window = ExpiryWindow::new(date!(2025 - 01 - 05), 14);
        assert_eq!(
            window.upcoming_range(),
            (date!(2025 - 01 - 05), date!(2025 - 01 - 19))
        );
        assert!(window.is_upcoming(date!(2025 - 01 - 05)));
        assert!(window.is_upcoming(date!(2025 - 01 - 19)));
        assert!(!window.is_upcoming(date!(2025 - 01 - 20)));
        assert!(!window.is_upcoming(date!(2025 - 01 - 04)));
    }

    #[test]
    fn test_expired_cutoff_is_yesterday() {
        let window = ExpiryWindow::new(date!(2025 - 03 - 01), 14);
        assert_eq!(window.expired_cutoff(), Some(date!(2025 - 02 - 28)));
        assert!(window.is_expired(date!(2025 - 02 - 28)));
        assert!(!window.is_expired(date!(2025 - 03 - 01)));
    }

    #[test]
    fn test_days_remaining_counts_today() {
        let window = ExpiryWindow::new(date!(2025 - 01 - 05), 14);
        assert_eq!(window.days_remaining(date!(2025 - 01 - 10)), 6);
        assert_eq!(window.days_remaining(date!(2025 - 01 - 05)), 1);
    }

    #[test]
    fn test_zero_day_window_only_today() {
        let window = ExpiryWindow::new(date!(2025 - 01 - 05), 0);
        assert!(window.is_upcoming(date!(2025 - 01 - 05)));
        assert!(!window.is_upcoming(date!(2025 - 01 - 06)));
    }

    #[test]
    fn test_huge_window_saturates() {
        let window = ExpiryWindow::new(date!(2025 - 01 - 05), u32::MAX);
        assert_eq!(window.upcoming_range().1, Date::MAX);
    }
}
