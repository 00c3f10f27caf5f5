//! Override ledger -- manual add / remove / offset adjustments to a schedule.
//!
//! Internally the ledger holds parsed, ordered collections. The space-delimited
//! string encoding (`"2024-01-04 2024-01-10"`, offsets as `"2024-01-04:2"`) only
//! exists at the persistence boundary, via [`OverrideEncoding`].
//!
//! Two decoding paths exist on purpose:
//!
//! - [`OverrideEncoding::decode`] is strict. It is used for overrides supplied
//!   as configuration, where a malformed token aborts the recompute.
//! - [`OverrideEncoding::decode_pruned`] drops tokens it cannot parse. A token
//!   that cannot be parsed cannot be compared to the pruning boundary either,
//!   so it is discarded along with the stale entries.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dates;
use crate::error::{ChoreError, Result};

/// A shift applied to one specific computed due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOffset {
    pub date: NaiveDate,
    pub days: i64,
}

impl DateOffset {
    /// Parse a `YYYY-MM-DD:delta` token.
    ///
    /// # Errors
    /// Returns `ChoreError::Parse` when the separator is missing, the date is
    /// invalid, or the delta is not a signed integer.
    pub fn parse(token: &str) -> Result<Self> {
        let (date, delta) = token
            .trim()
            .split_once(':')
            .ok_or_else(|| ChoreError::parse(token, "expected DATE:DAYS"))?;
        let date = dates::parse_date(date)?;
        let days = delta
            .trim()
            .parse::<i64>()
            .map_err(|e| ChoreError::parse(token, e))?;
        Ok(DateOffset { date, days })
    }

    pub fn encode(&self) -> String {
        format!("{}:{}", dates::format_date(self.date), self.days)
    }
}

/// Persisted string form of a ledger, one optional token list per collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideEncoding {
    #[serde(default)]
    pub add_dates: Option<String>,
    #[serde(default)]
    pub remove_dates: Option<String>,
    #[serde(default)]
    pub offset_dates: Option<String>,
}

impl OverrideEncoding {
    /// Strictly decode every token.
    ///
    /// # Errors
    /// Returns the first `ChoreError::Parse` encountered.
    pub fn decode(&self) -> Result<OverrideLedger> {
        let mut ledger = OverrideLedger::default();
        if let Some(text) = &self.add_dates {
            ledger.added.extend(dates::parse_date_list(text)?);
        }
        if let Some(text) = &self.remove_dates {
            ledger.removed.extend(dates::parse_date_list(text)?);
        }
        if let Some(text) = &self.offset_dates {
            for token in dates::split_tokens(text) {
                let offset = DateOffset::parse(token)?;
                ledger.offsets.insert(offset.date, offset.days);
            }
        }
        Ok(ledger)
    }

    /// Decode while pruning: tokens before `boundary` and tokens that fail to
    /// parse are both dropped.
    pub fn decode_pruned(&self, boundary: NaiveDate) -> OverrideLedger {
        let mut ledger = OverrideLedger::default();
        let keep = |token: &str, parsed: Result<NaiveDate>| match parsed {
            Ok(date) if date >= boundary => Some(date),
            Ok(_) => None,
            Err(e) => {
                debug!(token, error = %e, "dropping unparsable override token");
                None
            }
        };

        if let Some(text) = &self.add_dates {
            ledger.added.extend(
                dates::split_tokens(text).filter_map(|t| keep(t, dates::parse_date(t))),
            );
        }
        if let Some(text) = &self.remove_dates {
            ledger.removed.extend(
                dates::split_tokens(text).filter_map(|t| keep(t, dates::parse_date(t))),
            );
        }
        if let Some(text) = &self.offset_dates {
            for token in dates::split_tokens(text) {
                match DateOffset::parse(token) {
                    Ok(offset) if offset.date >= boundary => {
                        ledger.offsets.insert(offset.date, offset.days);
                    }
                    Ok(_) => {}
                    Err(e) => debug!(token, error = %e, "dropping unparsable offset token"),
                }
            }
        }
        ledger
    }
}

/// Per-chore manual adjustments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideLedger {
    added: BTreeSet<NaiveDate>,
    removed: BTreeSet<NaiveDate>,
    offsets: BTreeMap<NaiveDate, i64>,
}

impl OverrideLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.offsets.is_empty()
    }

    /// Force `date` to be a due date. Returns `false` if it was already added.
    pub fn add(&mut self, date: NaiveDate) -> bool {
        self.added.insert(date)
    }

    /// Suppress `date` as a due date. Returns `false` if it was already removed.
    pub fn remove(&mut self, date: NaiveDate) -> bool {
        self.removed.insert(date)
    }

    /// Shift the computed due date `date` by `days`, replacing any earlier
    /// offset for the same date.
    pub fn offset(&mut self, date: NaiveDate, days: i64) {
        self.offsets.insert(date, days);
    }

    /// Fold another ledger into this one. Offsets from `other` win on conflict.
    pub fn merge(&mut self, other: OverrideLedger) {
        self.added.extend(other.added);
        self.removed.extend(other.removed);
        self.offsets.extend(other.offsets);
    }

    pub fn added(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.added.iter().copied()
    }

    pub fn removed(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.removed.iter().copied()
    }

    pub fn offsets(&self) -> impl Iterator<Item = DateOffset> + '_ {
        self.offsets
            .iter()
            .map(|(date, days)| DateOffset { date: *date, days: *days })
    }

    /// Drop every entry strictly earlier than `boundary`. Returns how many
    /// entries were removed.
    pub fn prune(&mut self, boundary: NaiveDate) -> usize {
        let before = self.added.len() + self.removed.len() + self.offsets.len();
        self.added.retain(|d| *d >= boundary);
        self.removed.retain(|d| *d >= boundary);
        self.offsets.retain(|d, _| *d >= boundary);
        before - (self.added.len() + self.removed.len() + self.offsets.len())
    }

    /// Adjust a raw candidate: `None` when it is suppressed, the shifted date
    /// when an offset targets it, otherwise the candidate unchanged.
    ///
    /// Added dates are not consulted here; they are merged into the due-date
    /// list by the scheduler.
    pub fn apply(&self, candidate: NaiveDate) -> Option<NaiveDate> {
        if self.removed.contains(&candidate) {
            return None;
        }
        match self.offsets.get(&candidate) {
            Some(days) => dates::add_days(candidate, *days),
            None => Some(candidate),
        }
    }

    /// Encode into the persisted string form. Empty collections encode as `None`.
    pub fn encode(&self) -> OverrideEncoding {
        let non_empty = |s: String| (!s.is_empty()).then_some(s);
        OverrideEncoding {
            add_dates: non_empty(dates::join_dates(self.added())),
            remove_dates: non_empty(dates::join_dates(self.removed())),
            offset_dates: non_empty(
                self.offsets()
                    .map(|o| o.encode())
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
        }
    }
}

/// Ledgers for several chores sharing one backing store, keyed by entity id.
/// Every operation is scoped to a single key.
#[derive(Debug, Clone, Default)]
pub struct LedgerStore {
    ledgers: HashMap<String, OverrideLedger>,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, entity_id: &str) -> Option<&OverrideLedger> {
        self.ledgers.get(entity_id)
    }

    /// The ledger for `entity_id`, created empty on first use.
    pub fn ledger_mut(&mut self, entity_id: &str) -> &mut OverrideLedger {
        self.ledgers.entry(entity_id.to_string()).or_default()
    }

    /// Prune only the ledger stored under `entity_id`.
    pub fn prune(&mut self, entity_id: &str, boundary: NaiveDate) -> usize {
        self.ledgers
            .get_mut(entity_id)
            .map_or(0, |ledger| ledger.prune(boundary))
    }

    pub fn remove(&mut self, entity_id: &str) -> Option<OverrideLedger> {
        self.ledgers.remove(entity_id)
    }
}
