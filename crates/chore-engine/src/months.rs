//! Active-month window -- restricts a chore to part of the year.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Lowercase three-letter month names, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Parse a month name (`"jan"`, `"January"`, case-insensitive) into 1..=12.
pub fn parse_month(name: &str) -> Option<u32> {
    let lower = name.trim().to_ascii_lowercase();
    let prefix = lower.get(..3)?;
    MONTH_NAMES
        .iter()
        .position(|m| *m == prefix)
        .and_then(|i| u32::try_from(i + 1).ok())
}

/// An inclusive month range. `first > last` wraps over the new year
/// (e.g. Nov..Feb for a winter-only chore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveMonths {
    pub first: u32,
    pub last: u32,
}

impl Default for ActiveMonths {
    fn default() -> Self {
        ActiveMonths { first: 1, last: 12 }
    }
}

impl ActiveMonths {
    pub fn new(first: u32, last: u32) -> Self {
        ActiveMonths {
            first: first.clamp(1, 12),
            last: last.clamp(1, 12),
        }
    }

    /// Whether `date` falls inside the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        let month = date.month();
        if self.first <= self.last {
            self.first <= month && month <= self.last
        } else {
            self.first <= month || month <= self.last
        }
    }

    /// Move a date outside the window forward to the first day of the window's
    /// next opening. Dates inside the window are returned unchanged.
    pub fn move_into(&self, date: NaiveDate) -> NaiveDate {
        if self.contains(date) {
            return date;
        }
        let year = if self.first <= self.last && self.last < date.month() {
            date.year() + 1
        } else {
            date.year()
        };
        NaiveDate::from_ymd_opt(year, self.first, 1).unwrap_or(date)
    }
}
