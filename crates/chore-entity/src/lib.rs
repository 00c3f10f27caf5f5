//! # chore-entity
//!
//! Host-facing adapter for `chore-engine`. A [`ChoreEntity`] owns one chore's
//! schedule, override ledger and completion history; on each update it asks
//! the pure scheduler for a projection, fires the `chore_helper_loaded` event
//! and writes the entity state through the [`HostPlatform`] capabilities.
//!
//! ## Modules
//!
//! - [`host`] — Capabilities consumed from the host (clock, readiness, event bus, state store)
//! - [`attributes`] — Event payload, published attributes and state snapshot
//! - [`entity`] — The stateful chore entity and its override services
//! - [`error`] — Error types

pub mod attributes;
pub mod entity;
pub mod error;
pub mod host;

pub use attributes::{
    ChoreAttributes, ChoreLoadedEvent, EntitySnapshot, CHORE_LOADED_EVENT, DEVICE_CLASS,
};
pub use entity::{ChoreEntity, UpdateOutcome};
pub use error::EntityError;
pub use host::{Clock, HostPlatform, ZonedClock};
