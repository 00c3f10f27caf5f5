//! # chore-engine
//!
//! Deterministic due-date scheduling for recurring household chores.
//!
//! Given a chore's recurrence rule, its manual overrides and its completion
//! history, the engine computes the upcoming due dates and classifies the next
//! one (scheduled, due today or tomorrow, overdue, or no schedule at all). It
//! performs no I/O: the host supplies "now" and receives a pure [`Projection`].
//!
//! ## Modules
//!
//! - [`dates`] — `YYYY-MM-DD` token parsing/formatting and calendar helpers
//! - [`recurrence`] — Recurrence rule variants (every N days/weeks/months/years, custom dates)
//! - [`months`] — Active-month window
//! - [`overrides`] — Add / remove / offset override ledger
//! - [`completion`] — Completion history
//! - [`config`] — Option bag → validated [`ChoreSchedule`]
//! - [`state`] — Derived [`ChoreState`] and status classes
//! - [`scheduler`] — The scheduler tying it all together
//! - [`error`] — Error types

pub mod completion;
pub mod config;
pub mod dates;
pub mod error;
pub mod months;
pub mod overrides;
pub mod recurrence;
pub mod scheduler;
pub mod state;

pub use completion::CompletionRecord;
pub use config::{AnchorMode, ChoreOptions, ChoreSchedule, Frequency, FrequencyUnit, IconSet};
pub use error::ChoreError;
pub use months::ActiveMonths;
pub use overrides::{DateOffset, LedgerStore, OverrideEncoding, OverrideLedger};
pub use recurrence::{MonthDay, Recurrence};
pub use scheduler::{Projection, Scheduler};
pub use state::{ChorePhase, ChoreState, StatusClass};
