//! Date token helpers shared by the rule, ledger, and scheduler.
//!
//! All tokens use the fixed `YYYY-MM-DD` calendar format. Lists of tokens are
//! space-delimited at the persistence boundary and parsed into `NaiveDate`
//! collections everywhere else.

use chrono::{Datelike, Days, NaiveDate};

use crate::error::{ChoreError, Result};

/// `strftime` pattern for every date token read or written by this crate.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a single `YYYY-MM-DD` token.
///
/// # Errors
/// Returns `ChoreError::Parse` for anything that is not a valid calendar date.
pub fn parse_date(token: &str) -> Result<NaiveDate> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Err(ChoreError::parse(token, "empty date token"));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|e| ChoreError::parse(token, e))
}

/// Format a date as a `YYYY-MM-DD` token.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Convert dates into their token form, preserving order.
pub fn to_text_list(dates: &[NaiveDate]) -> Vec<String> {
    dates.iter().copied().map(format_date).collect()
}

/// Parse a space-delimited list of date tokens.
///
/// Blank input yields an empty list. A single malformed token fails the whole
/// list; callers that may drop bad tokens use [`split_tokens`] instead.
pub fn parse_date_list(text: &str) -> Result<Vec<NaiveDate>> {
    split_tokens(text).map(parse_date).collect()
}

/// Join dates into a space-delimited token list.
pub fn join_dates<I>(dates: I) -> String
where
    I: IntoIterator<Item = NaiveDate>,
{
    dates
        .into_iter()
        .map(format_date)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Iterate the non-empty whitespace-separated tokens of a persisted list.
pub fn split_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}

/// Signed number of days from `from` to `to`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Shift a date by a signed number of days. `None` only at the edges of the
/// representable calendar.
pub fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

/// Number of days in the given month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}

/// Build a date, clamping `day` to the last day of the month
/// (e.g. day 31 in February becomes Feb 28/29).
pub fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let day = day.clamp(1, days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
}

/// First day of the month containing `date`.
pub fn first_of_month(date: NaiveDate) -> Option<NaiveDate> {
    date.with_day(1)
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let back = i64::from(date.weekday().num_days_from_monday());
    add_days(date, -back).unwrap_or(date)
}

/// Zero-based month count since year 0, used for month-interval arithmetic.
pub fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}
