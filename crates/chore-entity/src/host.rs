//! Capabilities consumed from the home-automation host.
//!
//! The adapter never talks to a runtime directly; everything it needs (the
//! clock, readiness, the event bus and the state store) comes through
//! [`HostPlatform`]. Tests substitute an in-memory host.

use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use serde_json::Value;

use crate::attributes::EntitySnapshot;
use crate::error::{EntityError, Result};

/// The authoritative, timezone-aware "now".
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock resolved in one IANA zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZonedClock {
    tz: Tz,
}

impl ZonedClock {
    /// # Errors
    /// Returns `EntityError::Timezone` when `name` is not an IANA zone.
    pub fn new(name: &str) -> Result<Self> {
        let tz: Tz = name
            .parse()
            .map_err(|_| EntityError::Timezone(name.to_string()))?;
        Ok(ZonedClock { tz })
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// `instant` seen in this clock's zone.
    pub fn at(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.tz).fixed_offset()
    }
}

impl Clock for ZonedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.at(Utc::now())
    }
}

/// Everything the entity needs from its host.
pub trait HostPlatform: Clock {
    /// Whether the host has finished starting up.
    fn is_running(&self) -> bool;

    /// Whether `entity_id` has been registered with the host.
    fn is_registered(&self, entity_id: &str) -> bool;

    /// Fire `event_type` on the host event bus.
    fn fire_event(&mut self, event_type: &str, payload: Value);

    /// Replace the published state of `entity_id`.
    fn write_state(&mut self, entity_id: &str, snapshot: &EntitySnapshot);
}
