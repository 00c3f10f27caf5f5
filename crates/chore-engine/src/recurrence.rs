//! Recurrence rules -- compute the next raw due-date candidate for a chore.
//!
//! A [`Recurrence`] is a tagged value selected from configuration. Every variant
//! shares one contract: given a cursor (`after`) and the schedule anchor, return
//! the earliest qualifying date on or after the cursor, never earlier than the
//! anchor itself. `None` means the rule has no further dates.
//!
//! Interval variants count whole units (days, Monday-based weeks, calendar
//! months, years) from the anchor and accept a unit when its distance from the
//! anchor is a multiple of `period`. Month and year arithmetic clamps to the end
//! of short months, so Jan 31 + 1 month lands on the last day of February.

use chrono::{Datelike, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::dates;
use crate::error::{ChoreError, Result};

/// Months to scan for an nth-weekday / nth-week occurrence before giving up.
/// Every weekday occurs a fifth time at least once in any five-month run, so a
/// miss across this many qualifying months means the rule can never fire.
const MAX_MONTH_SCAN: u32 = 60;

/// Which day of a qualifying month a monthly chore falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonthDay {
    /// The anchor's day of month, clamped to the month length.
    AnchorDay,
    /// A fixed day of month (1..=31), clamped to the month length.
    DayOfMonth(u32),
    /// The nth occurrence of a weekday in the month. Negative counts from the
    /// end, so `-1` is the last one.
    NthWeekday { weekday: Weekday, order: i8 },
    /// The weekday inside the nth Monday-based calendar week of the month.
    /// Negative counts from the last week.
    NthWeek { weekday: Weekday, order: i8 },
}

/// A recurrence rule variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recurrence {
    /// Every `period` days from the anchor.
    EveryNDays { period: u32 },
    /// On the given weekdays of every `period`-th week from the anchor's week.
    Weekly { period: u32, days: Vec<Weekday> },
    /// Once in every `period`-th month from the anchor's month.
    Monthly { period: u32, day: MonthDay },
    /// Once in every `period`-th year from the anchor's year. `date` is
    /// `(month, day)`; `None` uses the anchor's month and day.
    Yearly {
        period: u32,
        date: Option<(u32, u32)>,
    },
    /// An explicit, finite list of dates.
    CustomDates { dates: Vec<NaiveDate> },
    /// Never produces a date.
    Blank,
}

impl Recurrence {
    /// Build a weekly rule, normalising the weekday list to Monday-first order
    /// without duplicates.
    pub fn weekly(period: u32, days: impl IntoIterator<Item = Weekday>) -> Self {
        let mut days: Vec<Weekday> = days.into_iter().collect();
        days.sort_by_key(|d| d.num_days_from_monday());
        days.dedup();
        Recurrence::Weekly { period, days }
    }

    /// Build a custom-dates rule, sorting and de-duplicating the list.
    pub fn custom_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        let mut dates: Vec<NaiveDate> = dates.into_iter().collect();
        dates.sort();
        dates.dedup();
        Recurrence::CustomDates { dates }
    }

    /// The interval length for interval variants.
    pub fn period(&self) -> Option<u32> {
        match self {
            Recurrence::EveryNDays { period }
            | Recurrence::Weekly { period, .. }
            | Recurrence::Monthly { period, .. }
            | Recurrence::Yearly { period, .. } => Some(*period),
            Recurrence::CustomDates { .. } | Recurrence::Blank => None,
        }
    }

    /// Whether this rule computes dates relative to a schedule anchor.
    pub fn needs_anchor(&self) -> bool {
        self.period().is_some()
    }

    /// Check the rule's parameters, naming `chore` in any failure.
    ///
    /// # Errors
    /// Returns `ChoreError::Configuration` for a zero period, an empty weekday
    /// list, an out-of-range day of month or order number, or an impossible
    /// yearly date.
    pub fn validate(&self, chore: &str) -> Result<()> {
        if self.period() == Some(0) {
            return Err(ChoreError::config(chore, "period must be at least 1"));
        }
        match self {
            Recurrence::Weekly { days, .. } if days.is_empty() => Err(ChoreError::config(
                chore,
                "weekly chore needs at least one chore day",
            )),
            Recurrence::Monthly {
                day: MonthDay::DayOfMonth(d),
                ..
            } if !(1..=31).contains(d) => Err(ChoreError::config(
                chore,
                format!("day of month must be between 1 and 31, got {}", d),
            )),
            Recurrence::Monthly {
                day: MonthDay::NthWeekday { order, .. } | MonthDay::NthWeek { order, .. },
                ..
            } if *order == 0 || !(-5..=5).contains(order) => Err(ChoreError::config(
                chore,
                format!(
                    "weekday order number must be 1..5 or -1..-5, got {}",
                    order
                ),
            )),
            Recurrence::Yearly {
                date: Some((month, day)),
                ..
            } if NaiveDate::from_ymd_opt(2024, *month, *day).is_none() => Err(
                ChoreError::config(chore, format!("invalid yearly date {}/{}", month, day)),
            ),
            _ => Ok(()),
        }
    }

    /// Earliest qualifying date on or after `after`, never before
    /// `schedule_start`.
    pub fn next_candidate(&self, after: NaiveDate, schedule_start: NaiveDate) -> Option<NaiveDate> {
        let day1 = after.max(schedule_start);
        match self {
            Recurrence::EveryNDays { period } => every_n_days(day1, schedule_start, *period),
            Recurrence::Weekly { period, days } => weekly(day1, schedule_start, *period, days),
            Recurrence::Monthly { period, day } => monthly(day1, schedule_start, *period, *day),
            Recurrence::Yearly { period, date } => {
                let (month, day) = date.unwrap_or((schedule_start.month(), schedule_start.day()));
                yearly(day1, schedule_start, *period, month, day)
            }
            Recurrence::CustomDates { dates } => dates.iter().copied().find(|d| *d >= day1),
            Recurrence::Blank => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Variant arithmetic
// ---------------------------------------------------------------------------

fn every_n_days(day1: NaiveDate, anchor: NaiveDate, period: u32) -> Option<NaiveDate> {
    let period = i64::from(period.max(1));
    let remainder = dates::days_between(anchor, day1).rem_euclid(period);
    if remainder == 0 {
        return Some(day1);
    }
    dates::add_days(day1, period - remainder)
}

fn weekly(day1: NaiveDate, anchor: NaiveDate, period: u32, days: &[Weekday]) -> Option<NaiveDate> {
    let period = i64::from(period.max(1));
    let monday = dates::week_start(day1);
    let week = dates::days_between(dates::week_start(anchor), monday) / 7;

    let day_in_week = |monday: NaiveDate, wd: &Weekday| {
        dates::add_days(monday, i64::from(wd.num_days_from_monday()))
    };

    if week.rem_euclid(period) == 0 {
        let this_week = days
            .iter()
            .filter_map(|wd| day_in_week(monday, wd))
            .find(|d| *d >= day1);
        if this_week.is_some() {
            return this_week;
        }
    }

    let skip = period - week.rem_euclid(period);
    let next_monday = dates::add_days(monday, skip * 7)?;
    days.first().and_then(|wd| day_in_week(next_monday, wd))
}

fn monthly(day1: NaiveDate, anchor: NaiveDate, period: u32, day: MonthDay) -> Option<NaiveDate> {
    let period = period.max(1);
    let mut month = dates::first_of_month(day1)?;

    let offset =
        (dates::month_index(month) - dates::month_index(anchor)).rem_euclid(i64::from(period));
    if offset != 0 {
        let ahead = u32::try_from(i64::from(period) - offset).ok()?;
        month = month.checked_add_months(Months::new(ahead))?;
    }

    for _ in 0..MAX_MONTH_SCAN {
        if let Some(candidate) = day_in_month(month, anchor, day) {
            if candidate >= day1 {
                return Some(candidate);
            }
        }
        month = month.checked_add_months(Months::new(period))?;
    }
    None
}

/// Resolve a [`MonthDay`] inside the month starting at `first`. `None` when
/// the month has no such day (e.g. a fifth Friday).
fn day_in_month(first: NaiveDate, anchor: NaiveDate, day: MonthDay) -> Option<NaiveDate> {
    let (year, month) = (first.year(), first.month());
    match day {
        MonthDay::AnchorDay => dates::clamped_date(year, month, anchor.day()),
        MonthDay::DayOfMonth(d) => dates::clamped_date(year, month, d),
        MonthDay::NthWeekday { weekday, order } => nth_weekday(first, weekday, order),
        MonthDay::NthWeek { weekday, order } => nth_week(first, weekday, order),
    }
}

fn nth_weekday(first: NaiveDate, weekday: Weekday, order: i8) -> Option<NaiveDate> {
    let last = dates::clamped_date(first.year(), first.month(), 31)?;
    let target = i64::from(weekday.num_days_from_monday());
    let candidate = if order > 0 {
        let lead = (target - i64::from(first.weekday().num_days_from_monday())).rem_euclid(7);
        dates::add_days(first, lead + (i64::from(order) - 1) * 7)?
    } else {
        let lag = (i64::from(last.weekday().num_days_from_monday()) - target).rem_euclid(7);
        dates::add_days(last, -(lag + (i64::from(-order) - 1) * 7))?
    };
    (candidate >= first && candidate <= last).then_some(candidate)
}

fn nth_week(first: NaiveDate, weekday: Weekday, order: i8) -> Option<NaiveDate> {
    let last = dates::clamped_date(first.year(), first.month(), 31)?;
    let monday = if order > 0 {
        dates::add_days(dates::week_start(first), (i64::from(order) - 1) * 7)?
    } else {
        dates::add_days(dates::week_start(last), -(i64::from(-order) - 1) * 7)?
    };
    let candidate = dates::add_days(monday, i64::from(weekday.num_days_from_monday()))?;
    (candidate >= first && candidate <= last).then_some(candidate)
}

fn yearly(
    day1: NaiveDate,
    anchor: NaiveDate,
    period: u32,
    month: u32,
    day: u32,
) -> Option<NaiveDate> {
    let period = i64::from(period.max(1));
    let mut year = i64::from(day1.year());
    let on = |year: i64| -> Option<NaiveDate> {
        dates::clamped_date(i32::try_from(year).ok()?, month, day)
    };

    if on(year)? < day1 {
        year += 1;
    }
    let remainder = (year - i64::from(anchor.year())).rem_euclid(period);
    if remainder != 0 {
        year += period - remainder;
    }
    on(year)
}
