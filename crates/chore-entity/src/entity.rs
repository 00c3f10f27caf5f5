//! The chore entity -- owns one chore's schedule, overrides and completion
//! history, and pushes each computed projection to the host.
//!
//! The scheduler itself is pure. Everything with a side effect lives here:
//! readiness gating, the loaded event, the state write and the override
//! services. An update that finds the host not ready does nothing and is
//! retried on the next cycle.

use chore_engine::{
    ChoreOptions, ChorePhase, ChoreSchedule, ChoreState, CompletionRecord, OverrideLedger,
    Projection, Scheduler, StatusClass,
};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::attributes::{
    ChoreAttributes, ChoreLoadedEvent, EntitySnapshot, CHORE_LOADED_EVENT, DEVICE_CLASS,
};
use crate::error::Result;
use crate::host::HostPlatform;

/// What an update cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The host was not ready, the state was already current, or a service
    /// had nothing to act on. No side effects were performed.
    Skipped,
    /// A projection was computed and the loaded event fired. `published`
    /// tells whether the state was written too.
    Computed { published: bool },
}

/// Whether a recompute writes state on a manual-mode chore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Publish {
    Auto,
    Always,
}

#[derive(Debug, Clone)]
pub struct ChoreEntity {
    entity_id: String,
    scheduler: Scheduler,
    ledger: OverrideLedger,
    completion: CompletionRecord,
    due_dates: Vec<NaiveDate>,
    state: Option<ChoreState>,
    /// Set when inputs changed without a published recompute.
    stale: bool,
}

impl ChoreEntity {
    /// Build an entity from its persisted option bag. `title` names the chore
    /// when the bag has no `name`.
    ///
    /// # Errors
    /// Returns `EntityError::Chore` for an invalid configuration or a
    /// malformed override token. The error is logged before it is returned.
    pub fn from_options(
        entity_id: impl Into<String>,
        title: &str,
        options: &Value,
    ) -> Result<Self> {
        let build = || -> chore_engine::error::Result<(Scheduler, OverrideLedger)> {
            let options = ChoreOptions::from_value(options, title)?;
            let schedule = ChoreSchedule::from_options(title, &options)?;
            let ledger = options.overrides().decode()?;
            Ok((Scheduler::new(schedule)?, ledger))
        };

        let (scheduler, ledger) = build().inspect_err(|e| {
            error!(chore = title, error = %e, "invalid chore configuration");
        })?;

        Ok(ChoreEntity::new(entity_id, scheduler, ledger))
    }

    pub fn new(entity_id: impl Into<String>, scheduler: Scheduler, ledger: OverrideLedger) -> Self {
        ChoreEntity {
            entity_id: entity_id.into(),
            scheduler,
            ledger,
            completion: CompletionRecord::new(),
            due_dates: Vec::new(),
            state: None,
            stale: true,
        }
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn name(&self) -> &str {
        self.scheduler.name()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn ledger(&self) -> &OverrideLedger {
        &self.ledger
    }

    pub fn completion(&self) -> &CompletionRecord {
        &self.completion
    }

    /// Due dates from the last recompute.
    pub fn due_dates(&self) -> &[NaiveDate] {
        &self.due_dates
    }

    pub fn state(&self) -> Option<&ChoreState> {
        self.state.as_ref()
    }

    pub fn next_due_date(&self) -> Option<NaiveDate> {
        self.state.as_ref().and_then(|s| s.next_due_date)
    }

    /// `NotReady` until the first cycle completes.
    pub fn phase(&self) -> ChorePhase {
        self.state.as_ref().map_or(ChorePhase::NotReady, |s| s.phase)
    }

    // -----------------------------------------------------------------------
    // Restore
    // -----------------------------------------------------------------------

    /// Restore from the attributes the host persisted for this entity.
    ///
    /// The last completion and derived fields come back as they were; the
    /// override lists are decoded leniently and pruned at the current start
    /// date. The next update always recomputes.
    ///
    /// # Errors
    /// Returns `EntityError::Attributes` when `attributes` does not have the
    /// published attribute shape.
    pub fn restore(&mut self, attributes: &Value, now: DateTime<FixedOffset>) -> Result<()> {
        let restored: ChoreAttributes = serde_json::from_value(attributes.clone())?;

        if let Some(at) = restored.last_completed {
            self.completion.record(at);
        }
        let boundary = self.scheduler.start_date(&self.completion, &now);
        self.ledger.merge(restored.overrides().decode_pruned(boundary));

        if let Some(last_updated) = restored.last_updated {
            self.state = Some(ChoreState::classify(restored.next_due_date, last_updated));
        }
        self.stale = true;

        debug!(
            chore = self.name(),
            last_completed = ?restored.last_completed,
            next_due_date = ?restored.next_due_date,
            "restored chore state"
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Update cycle
    // -----------------------------------------------------------------------

    /// Whether a recompute is due: never computed, inputs changed since, last
    /// computed on an earlier day, or due today and already completed today.
    pub fn needs_update(&self, now: &DateTime<FixedOffset>) -> bool {
        let Some(state) = &self.state else {
            return true;
        };
        if self.stale {
            return true;
        }
        let today = now.date_naive();
        if state.last_updated.with_timezone(now.offset()).date_naive() != today {
            return true;
        }
        state.next_due_date == Some(today) && self.completion.completed_today(now)
    }

    fn is_ready<H: HostPlatform + ?Sized>(&self, host: &H) -> bool {
        host.is_running() && host.is_registered(&self.entity_id)
    }

    /// Periodic update. Skips when the host is not ready or the state is
    /// current; manual-mode chores compute and fire the event but do not
    /// write state.
    ///
    /// # Errors
    /// Returns `EntityError::Attributes` if the event payload cannot be
    /// serialized.
    pub fn update<H: HostPlatform + ?Sized>(&mut self, host: &mut H) -> Result<UpdateOutcome> {
        if !self.is_ready(host) {
            debug!(chore = self.name(), "host not ready, skipping update");
            return Ok(UpdateOutcome::Skipped);
        }
        let now = host.now();
        if !self.needs_update(&now) {
            debug!(chore = self.name(), "state is current, skipping update");
            return Ok(UpdateOutcome::Skipped);
        }
        self.recompute(host, now, Publish::Auto)
    }

    /// Recompute and publish regardless of throttling or manual mode. This
    /// is the external trigger manual-mode chores rely on.
    ///
    /// # Errors
    /// See [`ChoreEntity::update`].
    pub fn refresh<H: HostPlatform + ?Sized>(&mut self, host: &mut H) -> Result<UpdateOutcome> {
        if !self.is_ready(host) {
            debug!(chore = self.name(), "host not ready, skipping refresh");
            return Ok(UpdateOutcome::Skipped);
        }
        let now = host.now();
        self.recompute(host, now, Publish::Always)
    }

    /// Mark the chore completed at `completed_at` (default: now) and publish
    /// the new state. When the host is not ready the completion is still
    /// recorded and published on the next update.
    ///
    /// # Errors
    /// See [`ChoreEntity::update`].
    pub fn complete<H: HostPlatform + ?Sized>(
        &mut self,
        host: &mut H,
        completed_at: Option<DateTime<FixedOffset>>,
    ) -> Result<UpdateOutcome> {
        let now = host.now();
        let at = completed_at.unwrap_or(now);

        if !self.is_ready(host) {
            self.completion.record(at);
            self.stale = true;
            debug!(chore = self.name(), completed_at = %at, "host not ready, completion deferred");
            return Ok(UpdateOutcome::Skipped);
        }

        let mut ledger = self.ledger.clone();
        let projection = self
            .scheduler
            .complete(&mut self.completion, &mut ledger, at, now);
        self.ledger = ledger;
        self.commit(projection);
        self.publish(host, Publish::Always)
    }

    fn recompute<H: HostPlatform + ?Sized>(
        &mut self,
        host: &mut H,
        now: DateTime<FixedOffset>,
        publish: Publish,
    ) -> Result<UpdateOutcome> {
        let mut ledger = self.ledger.clone();
        let projection = self.scheduler.compute(&mut ledger, &self.completion, now);

        // Readiness may have changed while the due dates were loading.
        if !self.is_ready(host) {
            debug!(chore = self.name(), "host went away during recompute, discarding");
            return Ok(UpdateOutcome::Skipped);
        }

        self.ledger = ledger;
        self.commit(projection);
        self.publish(host, publish)
    }

    fn commit(&mut self, projection: Projection) {
        self.due_dates = projection.due_dates;
        self.state = Some(projection.state);
        self.stale = false;
    }

    fn publish<H: HostPlatform + ?Sized>(
        &self,
        host: &mut H,
        publish: Publish,
    ) -> Result<UpdateOutcome> {
        let event = ChoreLoadedEvent {
            entity_id: self.entity_id.clone(),
            due_dates: chore_engine::dates::to_text_list(&self.due_dates),
        };
        debug!(
            chore = self.name(),
            due_dates = event.due_dates.len(),
            "dates loaded, firing {}",
            CHORE_LOADED_EVENT
        );
        host.fire_event(CHORE_LOADED_EVENT, serde_json::to_value(&event)?);

        if publish == Publish::Auto && self.scheduler.schedule().manual {
            debug!(chore = self.name(), "manual chore, state not written");
            return Ok(UpdateOutcome::Computed { published: false });
        }
        host.write_state(&self.entity_id, &self.snapshot());
        Ok(UpdateOutcome::Computed { published: true })
    }

    // -----------------------------------------------------------------------
    // Override services
    // -----------------------------------------------------------------------

    /// Force `date` to be a due date, then refresh.
    ///
    /// # Errors
    /// See [`ChoreEntity::update`].
    pub fn add_date<H: HostPlatform + ?Sized>(
        &mut self,
        host: &mut H,
        date: NaiveDate,
    ) -> Result<UpdateOutcome> {
        if !self.ledger.add(date) {
            warn!(chore = self.name(), %date, "date was already added");
        }
        self.stale = true;
        self.refresh(host)
    }

    /// Suppress `date` (default: the next due date), then refresh.
    ///
    /// # Errors
    /// See [`ChoreEntity::update`].
    pub fn remove_date<H: HostPlatform + ?Sized>(
        &mut self,
        host: &mut H,
        date: Option<NaiveDate>,
    ) -> Result<UpdateOutcome> {
        let Some(date) = date.or_else(|| self.next_due_date()) else {
            warn!(chore = self.name(), "no date to remove");
            return Ok(UpdateOutcome::Skipped);
        };
        if !self.ledger.remove(date) {
            warn!(chore = self.name(), %date, "date was already removed");
        }
        self.stale = true;
        self.refresh(host)
    }

    /// Shift `date` (default: the next due date) by `days`, replacing any
    /// earlier offset for it, then refresh.
    ///
    /// # Errors
    /// See [`ChoreEntity::update`].
    pub fn offset_date<H: HostPlatform + ?Sized>(
        &mut self,
        host: &mut H,
        days: i64,
        date: Option<NaiveDate>,
    ) -> Result<UpdateOutcome> {
        let Some(date) = date.or_else(|| self.next_due_date()) else {
            warn!(chore = self.name(), "no date to offset");
            return Ok(UpdateOutcome::Skipped);
        };
        self.ledger.offset(date, days);
        self.stale = true;
        self.refresh(host)
    }

    // -----------------------------------------------------------------------
    // Publication
    // -----------------------------------------------------------------------

    /// The state value and attributes as they would be written now.
    pub fn snapshot(&self) -> EntitySnapshot {
        let state = self.state.as_ref();
        let days = state.and_then(|s| s.days);
        let status = state.map_or(StatusClass::Normal, |s| s.status);
        let overrides = self.ledger.encode();

        EntitySnapshot {
            state: days,
            attributes: ChoreAttributes {
                last_completed: self.completion.last_completed(),
                last_updated: state.map(|s| s.last_updated),
                overdue: state.is_some_and(|s| s.overdue),
                overdue_days: state.and_then(|s| s.overdue_days),
                next_due_date: state.and_then(|s| s.next_due_date),
                offset_dates: overrides.offset_dates,
                add_dates: overrides.add_dates,
                remove_dates: overrides.remove_dates,
                unit_of_measurement: if days == Some(1) { "day" } else { "days" }.to_string(),
                device_class: DEVICE_CLASS.to_string(),
                icon: self.scheduler.schedule().icons.for_status(status).to_string(),
            },
        }
    }
}
