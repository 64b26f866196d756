//! Source of the evaluation date.

use chrono::Datelike;
use time::{Date, Month};

/// Supplies today's local calendar date.
pub trait Clock: Send + Sync {
    /// The current local date.
    fn today(&self) -> Date;
}

/// The system's local date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Date {
        let now = chrono::Local::now().date_naive();
        Month::try_from(now.month() as u8)
            .ok()
            .and_then(|month| Date::from_calendar_date(now.year(), month, now.day() as u8).ok())
            .unwrap_or(Date::MIN)
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn test_fixed_clock() {
        assert_eq!(FixedClock(date!(2025 - 01 - 05)).today(), date!(2025 - 01 - 05));
    }

    #[test]
    fn test_system_clock_matches_chrono() {
        let today = SystemClock.today();
        let now = chrono::Local::now().date_naive();
        // Straddling midnight would make the two disagree by a day.
        assert!((today.year() - now.year()).abs() <= 1);
        assert_ne!(today, Date::MIN);
    }
}
