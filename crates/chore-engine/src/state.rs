//! Derived chore state -- the output of every recompute.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::dates;

/// Display class of a due date, used to pick the icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    #[default]
    Normal,
    Today,
    Tomorrow,
    Overdue,
}

impl StatusClass {
    pub fn from_days(days: i64) -> Self {
        match days {
            d if d < 0 => StatusClass::Overdue,
            0 => StatusClass::Today,
            1 => StatusClass::Tomorrow,
            _ => StatusClass::Normal,
        }
    }
}

/// Classification of a chore after a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChorePhase {
    /// No cycle has completed yet (host not ready, or configuration pending).
    NotReady,
    /// A due date today or later exists.
    Scheduled,
    /// The next due date is in the past.
    Overdue,
    /// The rule produced no further dates.
    NoSchedule,
}

/// Everything a recompute derives. Identical inputs give an identical state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoreState {
    pub next_due_date: Option<NaiveDate>,
    /// Signed days from today to the next due date.
    pub days: Option<i64>,
    pub overdue: bool,
    pub overdue_days: Option<i64>,
    pub status: StatusClass,
    pub phase: ChorePhase,
    pub last_updated: DateTime<FixedOffset>,
}

impl ChoreState {
    /// Classify `next_due_date` relative to `now`'s calendar date.
    pub fn classify(next_due_date: Option<NaiveDate>, now: DateTime<FixedOffset>) -> Self {
        let Some(due) = next_due_date else {
            return ChoreState {
                next_due_date: None,
                days: None,
                overdue: false,
                overdue_days: None,
                status: StatusClass::Normal,
                phase: ChorePhase::NoSchedule,
                last_updated: now,
            };
        };

        let days = dates::days_between(now.date_naive(), due);
        let overdue = days < 0;
        ChoreState {
            next_due_date: Some(due),
            days: Some(days),
            overdue,
            overdue_days: Some((-days).max(0)),
            status: StatusClass::from_days(days),
            phase: if overdue {
                ChorePhase::Overdue
            } else {
                ChorePhase::Scheduled
            },
            last_updated: now,
        }
    }
}
