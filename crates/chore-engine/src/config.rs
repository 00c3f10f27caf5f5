//! Chore configuration -- decode the host's option bag into a validated
//! [`ChoreSchedule`].
//!
//! The option bag arrives as a JSON object. [`ChoreOptions`] mirrors it field
//! by field (numbers may be JSON numbers or numeric strings, as UI number
//! selectors produce either). [`ChoreSchedule::from_options`] then validates it
//! and selects the [`Recurrence`] variant. Any missing or invalid parameter is a
//! `ChoreError::Configuration` naming the chore; nothing is silently defaulted.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::dates;
use crate::error::{ChoreError, Result};
use crate::months::{self, ActiveMonths};
use crate::overrides::OverrideEncoding;
use crate::recurrence::{MonthDay, Recurrence};
use crate::state::StatusClass;

pub const DEFAULT_ICON_NORMAL: &str = "mdi:broom";
pub const DEFAULT_ICON_TODAY: &str = "mdi:bell";
pub const DEFAULT_ICON_TOMORROW: &str = "mdi:bell-outline";
pub const DEFAULT_ICON_OVERDUE: &str = "mdi:bell-alert";

/// Upper bound on rule queries per due-date load.
pub const DEFAULT_SUPPRESSION_CAP: u32 = 1000;

// ---------------------------------------------------------------------------
// Frequency
// ---------------------------------------------------------------------------

/// Unit family of a frequency option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrequencyUnit {
    Days,
    Weeks,
    Months,
    Years,
    CustomDates,
    Blank,
}

/// How the interval anchor is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnchorMode {
    /// `every-n-*`: always count from the configured start date.
    Fixed,
    /// `after-n-*`: count from the last completion once it passes the start date.
    AfterCompletion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frequency {
    pub unit: FrequencyUnit,
    pub anchor: AnchorMode,
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (unit, anchor) = match s.trim() {
            "every-n-days" => (FrequencyUnit::Days, AnchorMode::Fixed),
            "every-n-weeks" => (FrequencyUnit::Weeks, AnchorMode::Fixed),
            "every-n-months" => (FrequencyUnit::Months, AnchorMode::Fixed),
            "every-n-years" => (FrequencyUnit::Years, AnchorMode::Fixed),
            "after-n-days" => (FrequencyUnit::Days, AnchorMode::AfterCompletion),
            "after-n-weeks" => (FrequencyUnit::Weeks, AnchorMode::AfterCompletion),
            "after-n-months" => (FrequencyUnit::Months, AnchorMode::AfterCompletion),
            "after-n-years" => (FrequencyUnit::Years, AnchorMode::AfterCompletion),
            "custom-dates" => (FrequencyUnit::CustomDates, AnchorMode::Fixed),
            "blank" => (FrequencyUnit::Blank, AnchorMode::Fixed),
            other => return Err(format!("Unknown frequency {}", other)),
        };
        Ok(Frequency { unit, anchor })
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.anchor {
            AnchorMode::Fixed => "every",
            AnchorMode::AfterCompletion => "after",
        };
        match self.unit {
            FrequencyUnit::Days => write!(f, "{}-n-days", prefix),
            FrequencyUnit::Weeks => write!(f, "{}-n-weeks", prefix),
            FrequencyUnit::Months => write!(f, "{}-n-months", prefix),
            FrequencyUnit::Years => write!(f, "{}-n-years", prefix),
            FrequencyUnit::CustomDates => f.write_str("custom-dates"),
            FrequencyUnit::Blank => f.write_str("blank"),
        }
    }
}

// ---------------------------------------------------------------------------
// Icons
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconSet {
    pub normal: String,
    pub today: String,
    pub tomorrow: String,
    pub overdue: String,
}

impl Default for IconSet {
    fn default() -> Self {
        IconSet {
            normal: DEFAULT_ICON_NORMAL.to_string(),
            today: DEFAULT_ICON_TODAY.to_string(),
            tomorrow: DEFAULT_ICON_TOMORROW.to_string(),
            overdue: DEFAULT_ICON_OVERDUE.to_string(),
        }
    }
}

impl IconSet {
    pub fn for_status(&self, status: StatusClass) -> &str {
        match status {
            StatusClass::Normal => &self.normal,
            StatusClass::Today => &self.today,
            StatusClass::Tomorrow => &self.tomorrow,
            StatusClass::Overdue => &self.overdue,
        }
    }
}

// ---------------------------------------------------------------------------
// Raw option bag
// ---------------------------------------------------------------------------

/// A weekday option that may be a single name or a list of names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn items(&self) -> Vec<&str> {
        match self {
            OneOrMany::One(s) => vec![s.as_str()],
            OneOrMany::Many(v) => v.iter().map(String::as_str).collect(),
        }
    }
}

/// The persisted option bag, field for field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChoreOptions {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub period: Option<i64>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub chore_day: Option<OneOrMany>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub day_of_month: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub weekday_order_number: Option<i64>,
    #[serde(default)]
    pub force_week_numbers: bool,
    /// Yearly due date as `MM/DD`.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub custom_dates: Option<String>,
    #[serde(default)]
    pub first_month: Option<String>,
    #[serde(default)]
    pub last_month: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub forecast_dates: Option<i64>,
    #[serde(default)]
    pub manual: bool,
    #[serde(default)]
    pub icon_normal: Option<String>,
    #[serde(default)]
    pub icon_today: Option<String>,
    #[serde(default)]
    pub icon_tomorrow: Option<String>,
    #[serde(default)]
    pub icon_overdue: Option<String>,
    #[serde(default)]
    pub add_dates: Option<String>,
    #[serde(default)]
    pub remove_dates: Option<String>,
    #[serde(default)]
    pub offset_dates: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub suppression_cap: Option<i64>,
}

/// Accept `3`, `3.0`, `"3"`, or `null`/`""` (absent).
fn lenient_int<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Int(n)) => Ok(Some(n)),
        Some(Raw::Float(f)) if f.fract() == 0.0 && f.abs() < 1e15 => Ok(Some(f as i64)),
        Some(Raw::Float(f)) => Err(D::Error::custom(format!(
            "expected a whole number, got {}",
            f
        ))),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|e| D::Error::custom(format!("'{}': {}", s, e))),
    }
}

impl ChoreOptions {
    /// Decode an option bag. `fallback_name` is used in error messages when
    /// the bag carries no `name`.
    ///
    /// # Errors
    /// Returns `ChoreError::Configuration` when the bag is not an object or a
    /// field has the wrong shape.
    pub fn from_value(value: &Value, fallback_name: &str) -> Result<Self> {
        let chore = value
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or(fallback_name);
        ChoreOptions::deserialize(value)
            .map_err(|e| ChoreError::config(chore, format!("invalid options: {}", e)))
    }

    /// Override token lists carried by the option bag.
    pub fn overrides(&self) -> OverrideEncoding {
        OverrideEncoding {
            add_dates: self.add_dates.clone(),
            remove_dates: self.remove_dates.clone(),
            offset_dates: self.offset_dates.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validated schedule
// ---------------------------------------------------------------------------

/// Immutable per-cycle chore configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoreSchedule {
    pub name: String,
    pub frequency: Frequency,
    pub rule: Recurrence,
    /// The configured anchor. Required for every interval frequency.
    pub start_date: Option<NaiveDate>,
    pub active_months: ActiveMonths,
    /// Extra due dates to look ahead beyond the next one.
    pub forecast_dates: u32,
    /// Compute on update but only publish on an explicit trigger.
    pub manual: bool,
    pub icons: IconSet,
    pub suppression_cap: u32,
}

impl ChoreSchedule {
    /// A schedule with default window, icons and caps.
    pub fn new(
        name: impl Into<String>,
        frequency: Frequency,
        rule: Recurrence,
        start_date: Option<NaiveDate>,
    ) -> Self {
        ChoreSchedule {
            name: name.into(),
            frequency,
            rule,
            start_date,
            active_months: ActiveMonths::default(),
            forecast_dates: 0,
            manual: false,
            icons: IconSet::default(),
            suppression_cap: DEFAULT_SUPPRESSION_CAP,
        }
    }

    /// Validate an option bag into a schedule.
    ///
    /// # Errors
    /// Returns `ChoreError::Configuration` naming the chore for an unknown
    /// frequency, a missing or non-positive period, a missing or malformed
    /// start date on an interval frequency, or any invalid frequency-specific
    /// parameter; `ChoreError::Parse` for a malformed custom date.
    pub fn from_options(fallback_name: &str, options: &ChoreOptions) -> Result<Self> {
        let name = options
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| fallback_name.to_string());
        let chore = name.as_str();

        let frequency: Frequency = options
            .frequency
            .as_deref()
            .ok_or_else(|| ChoreError::config(chore, "frequency is required"))?
            .parse()
            .map_err(|e: String| ChoreError::config(chore, e))?;

        let start_date = match options.start_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(token) => Some(dates::parse_date(token).map_err(|e| {
                ChoreError::config(chore, format!("invalid start_date: {}", e))
            })?),
        };

        let rule = build_rule(chore, frequency, start_date, options)?;
        if rule.needs_anchor() && start_date.is_none() {
            return Err(ChoreError::config(
                chore,
                format!("Please configure start_date for {} chore frequency.", frequency),
            ));
        }
        rule.validate(chore)?;

        let month = |value: &Option<String>, default: u32, key: &str| -> Result<u32> {
            match value.as_deref().map(str::trim) {
                None | Some("") => Ok(default),
                Some(text) => months::parse_month(text).ok_or_else(|| {
                    ChoreError::config(chore, format!("invalid {} '{}'", key, text))
                }),
            }
        };
        let active_months = ActiveMonths::new(
            month(&options.first_month, 1, "first_month")?,
            month(&options.last_month, 12, "last_month")?,
        );

        let forecast_dates = non_negative(chore, "forecast_dates", options.forecast_dates, 0)?;
        let suppression_cap = non_negative(
            chore,
            "suppression_cap",
            options.suppression_cap,
            DEFAULT_SUPPRESSION_CAP,
        )?
        .max(1);

        let pick = |value: &Option<String>, default: &str| {
            value
                .clone()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let icons = IconSet {
            normal: pick(&options.icon_normal, DEFAULT_ICON_NORMAL),
            today: pick(&options.icon_today, DEFAULT_ICON_TODAY),
            tomorrow: pick(&options.icon_tomorrow, DEFAULT_ICON_TOMORROW),
            overdue: pick(&options.icon_overdue, DEFAULT_ICON_OVERDUE),
        };

        Ok(ChoreSchedule {
            name,
            frequency,
            rule,
            start_date,
            active_months,
            forecast_dates,
            manual: options.manual,
            icons,
            suppression_cap,
        })
    }

    /// Decode and validate a raw option bag in one step.
    ///
    /// # Errors
    /// See [`ChoreOptions::from_value`] and [`ChoreSchedule::from_options`].
    pub fn from_value(fallback_name: &str, value: &Value) -> Result<Self> {
        let options = ChoreOptions::from_value(value, fallback_name)?;
        ChoreSchedule::from_options(fallback_name, &options)
    }
}

fn non_negative(chore: &str, key: &str, value: Option<i64>, default: u32) -> Result<u32> {
    match value {
        None => Ok(default),
        Some(v) => u32::try_from(v)
            .map_err(|_| {
                ChoreError::config(chore, format!("{} must be 0 or more, got {}", key, v))
            }),
    }
}

fn required_period(chore: &str, frequency: Frequency, period: Option<i64>) -> Result<u32> {
    let period = period.ok_or_else(|| {
        ChoreError::config(
            chore,
            format!("Please configure period for {} chore frequency.", frequency),
        )
    })?;
    u32::try_from(period)
        .ok()
        .filter(|p| *p >= 1)
        .ok_or_else(|| {
            ChoreError::config(chore, format!("period must be at least 1, got {}", period))
        })
}

fn parse_weekdays(chore: &str, value: Option<&OneOrMany>) -> Result<Vec<Weekday>> {
    value
        .map(OneOrMany::items)
        .unwrap_or_default()
        .into_iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.trim()
                .parse::<Weekday>()
                .map_err(|_| ChoreError::config(chore, format!("invalid chore_day '{}'", s)))
        })
        .collect()
}

fn order_number(chore: &str, value: Option<i64>) -> Result<i8> {
    let order = value.unwrap_or(1);
    i8::try_from(order)
        .map_err(|_| ChoreError::config(chore, format!("invalid weekday_order_number {}", order)))
}

fn parse_month_day(chore: &str, text: &str) -> Result<(u32, u32)> {
    let invalid = || ChoreError::config(chore, format!("invalid date '{}', expected MM/DD", text));
    let (month, day) = text.trim().split_once('/').ok_or_else(invalid)?;
    let month: u32 = month.trim().parse().map_err(|_| invalid())?;
    let day: u32 = day.trim().parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(2024, month, day).ok_or_else(invalid)?;
    Ok((month, day))
}

fn build_rule(
    chore: &str,
    frequency: Frequency,
    start_date: Option<NaiveDate>,
    options: &ChoreOptions,
) -> Result<Recurrence> {
    let rule = match frequency.unit {
        FrequencyUnit::Days => Recurrence::EveryNDays {
            period: required_period(chore, frequency, options.period)?,
        },
        FrequencyUnit::Weeks => {
            let period = required_period(chore, frequency, options.period)?;
            let mut days = parse_weekdays(chore, options.chore_day.as_ref())?;
            if days.is_empty() {
                days.extend(start_date.map(|d| d.weekday()));
            }
            Recurrence::weekly(period, days)
        }
        FrequencyUnit::Months => {
            let period = required_period(chore, frequency, options.period)?;
            let weekdays = parse_weekdays(chore, options.chore_day.as_ref())?;
            if weekdays.len() > 1 {
                return Err(ChoreError::config(
                    chore,
                    format!("monthly chore takes a single chore_day, got {}", weekdays.len()),
                ));
            }
            let day = match (weekdays.first(), options.day_of_month) {
                (Some(weekday), _) if options.force_week_numbers => MonthDay::NthWeek {
                    weekday: *weekday,
                    order: order_number(chore, options.weekday_order_number)?,
                },
                (Some(weekday), _) => MonthDay::NthWeekday {
                    weekday: *weekday,
                    order: order_number(chore, options.weekday_order_number)?,
                },
                (None, Some(d)) if d < 0 => {
                    return Err(ChoreError::config(
                        chore,
                        format!("day of month must be between 1 and 31, got {}", d),
                    ));
                }
                (None, Some(d)) if d > 0 => MonthDay::DayOfMonth(u32::try_from(d).map_err(
                    |_| ChoreError::config(chore, format!("invalid day_of_month {}", d)),
                )?),
                // 0 means "the anchor's day".
                (None, _) => MonthDay::AnchorDay,
            };
            Recurrence::Monthly { period, day }
        }
        FrequencyUnit::Years => {
            let period = required_period(chore, frequency, options.period)?;
            let date = match options.date.as_deref().map(str::trim) {
                None | Some("") | Some("0") => None,
                Some(text) => Some(parse_month_day(chore, text)?),
            };
            Recurrence::Yearly { period, date }
        }
        FrequencyUnit::CustomDates => {
            let text = options.custom_dates.as_deref().unwrap_or_default();
            Recurrence::custom_dates(dates::parse_date_list(text)?)
        }
        FrequencyUnit::Blank => Recurrence::Blank,
    };
    Ok(rule)
}
