//! Completion history -- the only input mutated by marking a chore done.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// When a chore was completed, most recent last.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    last_completed: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    history: Vec<DateTime<FixedOffset>>,
}

impl CompletionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a record from a restored last-completed timestamp.
    pub fn from_last(last_completed: Option<DateTime<FixedOffset>>) -> Self {
        CompletionRecord {
            last_completed,
            history: last_completed.into_iter().collect(),
        }
    }

    /// Record a completion. A back-dated entry joins the history but only
    /// moves `last_completed` forward.
    pub fn record(&mut self, at: DateTime<FixedOffset>) {
        let pos = self.history.partition_point(|t| *t <= at);
        self.history.insert(pos, at);
        if self.last_completed.is_none_or(|last| at > last) {
            self.last_completed = Some(at);
        }
    }

    pub fn last_completed(&self) -> Option<DateTime<FixedOffset>> {
        self.last_completed
    }

    pub fn history(&self) -> &[DateTime<FixedOffset>] {
        &self.history
    }

    /// Calendar date of the last completion, seen from the offset of `now`.
    pub fn last_completed_date(&self, now: &DateTime<FixedOffset>) -> Option<NaiveDate> {
        self.last_completed
            .map(|at| at.with_timezone(now.offset()).date_naive())
    }

    /// Whether the chore was completed on `now`'s calendar date, no later
    /// than `now` itself.
    pub fn completed_today(&self, now: &DateTime<FixedOffset>) -> bool {
        self.last_completed.is_some_and(|at| {
            at.with_timezone(now.offset()).date_naive() == now.date_naive() && at <= *now
        })
    }
}
