//! Payloads exchanged with the host: the loaded event, the published
//! attribute set and the state snapshot.
//!
//! Dates serialize as `YYYY-MM-DD` and timestamps as RFC 3339, which is also
//! the shape [`ChoreAttributes`] accepts back when the host restores state.

use chore_engine::OverrideEncoding;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// Event fired once per successful recompute.
pub const CHORE_LOADED_EVENT: &str = "chore_helper_loaded";

/// Device class published with every chore entity.
pub const DEVICE_CLASS: &str = "chore_helper__schedule";

/// Payload of [`CHORE_LOADED_EVENT`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoreLoadedEvent {
    pub entity_id: String,
    pub due_dates: Vec<String>,
}

/// Published entity attributes.
///
/// Every field has a default so that a partial or older attribute set can
/// still be restored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoreAttributes {
    pub last_completed: Option<DateTime<FixedOffset>>,
    pub last_updated: Option<DateTime<FixedOffset>>,
    pub overdue: bool,
    pub overdue_days: Option<i64>,
    pub next_due_date: Option<NaiveDate>,
    pub offset_dates: Option<String>,
    pub add_dates: Option<String>,
    pub remove_dates: Option<String>,
    pub unit_of_measurement: String,
    pub device_class: String,
    pub icon: String,
}

impl ChoreAttributes {
    /// The override token lists carried by these attributes.
    pub fn overrides(&self) -> OverrideEncoding {
        OverrideEncoding {
            add_dates: self.add_dates.clone(),
            remove_dates: self.remove_dates.clone(),
            offset_dates: self.offset_dates.clone(),
        }
    }
}

/// What the entity writes to the host state store. `state` is the number of
/// days until the next due date, absent when there is none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub state: Option<i64>,
    pub attributes: ChoreAttributes,
}
