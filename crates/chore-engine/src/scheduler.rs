//! Chore scheduler -- combines the recurrence rule, the override ledger and the
//! completion record into a due-date list and a derived [`ChoreState`].
//!
//! Every cycle is a full, stateless projection: the same schedule, ledger,
//! completion record and `now` always yield the same output. The only mutation
//! a read-only recompute performs is pruning stale overrides, which is itself
//! idempotent.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::completion::CompletionRecord;
use crate::config::{AnchorMode, ChoreSchedule};
use crate::dates;
use crate::error::{ChoreError, Result};
use crate::overrides::OverrideLedger;
use crate::recurrence::Recurrence;
use crate::state::ChoreState;

/// Result of one full recompute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    /// Sorted, de-duplicated upcoming due dates (the lookahead list).
    pub due_dates: Vec<NaiveDate>,
    pub state: ChoreState,
}

impl Projection {
    /// Due dates in token form, as published to the host.
    pub fn due_date_tokens(&self) -> Vec<String> {
        dates::to_text_list(&self.due_dates)
    }
}

/// The scheduling engine for one chore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheduler {
    schedule: ChoreSchedule,
}

impl Scheduler {
    /// # Errors
    /// Returns `ChoreError::Configuration` if the rule parameters are invalid or
    /// an interval rule has no start date.
    pub fn new(schedule: ChoreSchedule) -> Result<Self> {
        schedule.rule.validate(&schedule.name)?;
        if schedule.rule.needs_anchor() && schedule.start_date.is_none() {
            return Err(ChoreError::config(
                &schedule.name,
                format!(
                    "Please configure start_date and period for {} chore frequency.",
                    schedule.frequency
                ),
            ));
        }
        Ok(Scheduler { schedule })
    }

    pub fn schedule(&self) -> &ChoreSchedule {
        &self.schedule
    }

    pub fn name(&self) -> &str {
        &self.schedule.name
    }

    /// Configured anchor, or Jan 1 of last year for rules without one.
    fn configured_start(&self, today: NaiveDate) -> NaiveDate {
        self.schedule.start_date.unwrap_or_else(|| {
            NaiveDate::from_ymd_opt(today.year() - 1, 1, 1).unwrap_or(today)
        })
    }

    /// First date the schedule may report, given the completion history.
    ///
    /// A completion on or after the configured start moves the start to the
    /// day after that completion, never to the completion day itself, so a day
    /// the chore was done on is not reported as due again. The result is moved
    /// into the active-month window.
    pub fn start_date(
        &self,
        completion: &CompletionRecord,
        now: &DateTime<FixedOffset>,
    ) -> NaiveDate {
        let mut start = self.configured_start(now.date_naive());
        if let Some(done) = completion.last_completed_date(now) {
            if done >= start {
                start = done.succ_opt().unwrap_or(done);
            }
        }
        self.schedule.active_months.move_into(start)
    }

    /// Anchor for interval arithmetic. In after-completion mode the last
    /// completion replaces the configured anchor once it is later.
    pub fn schedule_start_date(
        &self,
        completion: &CompletionRecord,
        now: &DateTime<FixedOffset>,
    ) -> NaiveDate {
        let start = self.configured_start(now.date_naive());
        match (self.schedule.frequency.anchor, completion.last_completed_date(now)) {
            (AnchorMode::AfterCompletion, Some(done)) if done > start => done,
            _ => start,
        }
    }

    /// Next raw candidate on or after `after`, before overrides.
    pub fn next_candidate(
        &self,
        after: NaiveDate,
        completion: &CompletionRecord,
        now: &DateTime<FixedOffset>,
    ) -> Option<NaiveDate> {
        let schedule_start = self.schedule_start_date(completion, now);
        let day1 = self.normalize_cursor(after, schedule_start, completion, now)?;
        self.schedule.rule.next_candidate(day1, schedule_start)
    }

    fn normalize_cursor(
        &self,
        after: NaiveDate,
        schedule_start: NaiveDate,
        completion: &CompletionRecord,
        now: &DateTime<FixedOffset>,
    ) -> Option<NaiveDate> {
        let today = now.date_naive();
        let mut day1 = after
            .max(self.start_date(completion, now))
            .max(schedule_start);
        if day1 == today && completion.completed_today(now) {
            day1 = day1.succ_opt()?;
        }
        // A monthly chore done this month is not due again until next month.
        if let (Recurrence::Monthly { .. }, Some(done)) =
            (&self.schedule.rule, completion.last_completed_date(now))
        {
            if (done.year(), done.month()) == (day1.year(), day1.month()) {
                day1 = dates::first_of_month(day1)?.checked_add_months(chrono::Months::new(1))?;
            }
        }
        Some(day1)
    }

    /// Build the lookahead list of due dates.
    ///
    /// Prunes the ledger at the start date, then asks the rule for
    /// `forecast_dates + 1` dates, skipping removed candidates, shifting offset
    /// ones, and stepping over months outside the active window. Added dates on
    /// or after the start are merged in. The loop is bounded by the schedule's
    /// suppression cap; hitting it ends the list early.
    pub fn load_due_dates(
        &self,
        ledger: &mut OverrideLedger,
        completion: &CompletionRecord,
        now: &DateTime<FixedOffset>,
    ) -> Vec<NaiveDate> {
        let chore = self.name();
        let start = self.start_date(completion, now);
        let pruned = ledger.prune(start);
        if pruned > 0 {
            debug!(chore, pruned, %start, "pruned stale overrides");
        }

        let wanted = self.schedule.forecast_dates as usize + 1;
        let cap = usize::try_from(self.schedule.suppression_cap).unwrap_or(usize::MAX);
        let mut due_dates: Vec<NaiveDate> = Vec::with_capacity(wanted.min(cap));
        let mut cursor = start;
        let mut iterations = 0u32;

        while due_dates.len() < wanted {
            if iterations >= self.schedule.suppression_cap {
                warn!(
                    chore,
                    cap = self.schedule.suppression_cap,
                    "suppression cap reached while resolving due dates"
                );
                break;
            }
            iterations += 1;

            let Some(candidate) = self.next_candidate(cursor, completion, now) else {
                break;
            };

            let moved = self.schedule.active_months.move_into(candidate);
            if moved != candidate {
                debug!(chore, %candidate, %moved, "candidate outside active months");
                cursor = moved;
                continue;
            }

            match ledger.apply(candidate) {
                Some(due) => due_dates.push(due),
                None => debug!(chore, %candidate, "candidate removed by override"),
            }

            match candidate.succ_opt() {
                Some(next) => cursor = next,
                None => break,
            }
        }

        due_dates.extend(ledger.added().filter(|d| *d >= start));
        due_dates.sort();
        due_dates.dedup();
        due_dates
    }

    /// Pick the next due date from a loaded list: the first on or after the
    /// start date, skipping today once the chore was completed today.
    pub fn next_due_date(
        &self,
        due_dates: &[NaiveDate],
        completion: &CompletionRecord,
        now: &DateTime<FixedOffset>,
    ) -> Option<NaiveDate> {
        let start = self.start_date(completion, now);
        let today = now.date_naive();
        let done_today = completion.completed_today(now);
        due_dates
            .iter()
            .copied()
            .filter(|d| *d >= start)
            .find(|d| !(*d == today && done_today))
    }

    /// Full recompute: load due dates, then classify the next one.
    pub fn compute(
        &self,
        ledger: &mut OverrideLedger,
        completion: &CompletionRecord,
        now: DateTime<FixedOffset>,
    ) -> Projection {
        debug!(chore = self.name(), %now, "computing chore state");
        let due_dates = self.load_due_dates(ledger, completion, &now);
        let next = self.next_due_date(&due_dates, completion, &now);
        let state = ChoreState::classify(next, now);
        debug!(
            chore = self.name(),
            next_due_date = ?state.next_due_date,
            days = ?state.days,
            "chore state computed"
        );
        Projection { due_dates, state }
    }

    /// Derived state only; see [`Scheduler::compute`].
    pub fn compute_state(
        &self,
        ledger: &mut OverrideLedger,
        completion: &CompletionRecord,
        now: DateTime<FixedOffset>,
    ) -> ChoreState {
        self.compute(ledger, completion, now).state
    }

    /// Mark the chore completed at `completed_at`, then recompute.
    ///
    /// The completion is recorded first because it moves the anchor. An empty
    /// due-date list afterwards is logged as a warning but is not an error; the
    /// state settles into `NoSchedule`.
    pub fn complete(
        &self,
        completion: &mut CompletionRecord,
        ledger: &mut OverrideLedger,
        completed_at: DateTime<FixedOffset>,
        now: DateTime<FixedOffset>,
    ) -> Projection {
        completion.record(completed_at);
        let projection = self.compute(ledger, completion, now);
        if projection.due_dates.is_empty() && self.schedule.rule != Recurrence::Blank {
            warn!(
                chore = self.name(),
                "no due dates after completion; check the chore configuration"
            );
        }
        projection
    }
}
