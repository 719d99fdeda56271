//! The desk: every caller-facing ticket operation behind one ledger lock.
//!
//! # Concurrency
//!
//! The ticket store and event log live together in a [`Ledger`] guarded by a
//! single mutex. Each operation holds the lock across its whole
//! read-check-write-persist sequence, so two `apply` calls on one ticket, or
//! an `apply` and a `tick`, never interleave.
//!
//! # Persistence
//!
//! After staging its changes into the ledger, an operation saves one snapshot.
//! If the save fails, the staged tickets and events are rolled back before
//! the error is returned, so memory never runs ahead of the backing store.
//!
//! When the backend hands out a [`StoreLock`], every write takes it first,
//! reloads the ledger, and keeps it until the save is done. Writes from other
//! processes are then seen by the version check instead of being overwritten.
//! Reads serve the ledger as of the last load.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::DeskConfig;
use crate::error::{DeskError, PersistenceError};
use crate::event::{CommentData, CreatedData, Event, EventDraft, EventType};
use crate::id::{IdGenerator, RandomIds};
use crate::lock::StoreLock;
use crate::log::EventLog;
use crate::model::{ChangeSet, Comment, NewTicket, Status, Ticket, TicketId, UserId};
use crate::mutate::{MutationContext, VersionedMutator, validate_sla_hours, validate_title};
use crate::query::{Page, Summary, TicketQuery};
use crate::sla::{self, SlaEngine};
use crate::store::{Persistence, SnapshotView, TicketStore};

/// Maximum characters in a comment body.
pub const MAX_COMMENT_BODY_CHARS: usize = 8_192;

const MAX_ID_ATTEMPTS: usize = 16;

/// Ticket store and event log, always locked together.
#[derive(Debug, Default)]
pub struct Ledger {
    pub store: TicketStore,
    pub log: EventLog,
}

impl Ledger {
    /// Load the persisted state.
    ///
    /// Tickets whose stored `sla_due` disagrees with `created_at + sla_hours`
    /// are repaired in memory; the repair is saved with the next change.
    fn load(persistence: &dyn Persistence) -> Result<Self, PersistenceError> {
        let snapshot = persistence.load()?;
        let mut store = TicketStore::new();
        for mut ticket in snapshot.tickets {
            let due = stored_due(&ticket)?;
            if ticket.sla_due != Some(due) {
                warn!(ticket = %ticket.id, "repairing stale sla_due");
                ticket.sla_due = Some(due);
            }
            if let Some(previous) = store.upsert(ticket) {
                warn!(ticket = %previous.id, "duplicate ticket id in store, keeping the later record");
            }
        }
        Ok(Self {
            store,
            log: EventLog::from_events(snapshot.events),
        })
    }

    fn view(&self) -> SnapshotView<'_> {
        SnapshotView {
            tickets: self.store.iter().collect(),
            events: self.log.all(),
        }
    }
}

/// Deadline a loaded ticket should carry. A budget no caller could have set
/// means the store was edited by hand or is damaged.
fn stored_due(ticket: &Ticket) -> Result<DateTime<Utc>, PersistenceError> {
    let invalid = |reason: String| PersistenceError::InvalidRecord {
        ticket: ticket.id.clone(),
        reason,
    };
    validate_sla_hours(ticket.sla_hours).map_err(|err| invalid(err.to_string()))?;
    sla::due_at(ticket.created_at, ticket.sla_hours)
        .ok_or_else(|| invalid("sla deadline is out of range".into()))
}

/// Result of an accepted mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub new_version: u64,
    pub ticket: Ticket,
    pub events: Vec<Event>,
}

pub struct DeskBuilder {
    persistence: Box<dyn Persistence>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    config: DeskConfig,
}

impl DeskBuilder {
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    #[must_use]
    pub const fn config(mut self, config: DeskConfig) -> Self {
        self.config = config;
        self
    }

    /// Load the persisted state and open the desk.
    ///
    /// # Errors
    ///
    /// Returns [`DeskError::Persistence`] if the backing store cannot be
    /// loaded, or holds a ticket whose SLA budget is out of range.
    pub fn open(self) -> Result<Desk, DeskError> {
        let ledger = {
            let _store_lock = self.persistence.lock()?;
            Ledger::load(self.persistence.as_ref())?
        };
        debug!(
            tickets = ledger.store.len(),
            events = ledger.log.len(),
            "desk opened"
        );

        Ok(Desk {
            ledger: Mutex::new(ledger),
            persistence: self.persistence,
            clock: self.clock,
            ids: self.ids,
            config: self.config,
            mutator: VersionedMutator,
            engine: SlaEngine,
        })
    }
}

pub struct Desk {
    ledger: Mutex<Ledger>,
    persistence: Box<dyn Persistence>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    config: DeskConfig,
    mutator: VersionedMutator,
    engine: SlaEngine,
}

impl std::fmt::Debug for Desk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Desk")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Undo record for one operation: prior ticket values and the log length.
struct Staged {
    prior: Vec<(TicketId, Option<Ticket>)>,
    log_mark: usize,
}

impl Desk {
    /// Start building a desk over `persistence`, with the system clock,
    /// random ids, and default config.
    #[must_use]
    pub fn builder(persistence: impl Persistence + 'static) -> DeskBuilder {
        DeskBuilder {
            persistence: Box::new(persistence),
            clock: Arc::new(SystemClock),
            ids: Arc::new(RandomIds),
            config: DeskConfig::default(),
        }
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn lock(&self) -> MutexGuard<'_, Ledger> {
        // Staging happens on clones and is rolled back on failure, so a
        // poisoned ledger is still consistent.
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the backend's lock and, if it has one, reload the ledger. Hold
    /// the returned lock until the operation's save is done.
    fn begin(&self, ledger: &mut Ledger) -> Result<Option<StoreLock>, DeskError> {
        let store_lock = self.persistence.lock()?;
        if store_lock.is_some() {
            *ledger = Ledger::load(self.persistence.as_ref())?;
        }
        Ok(store_lock)
    }

    /// Stage tickets and events into the ledger, then save.
    fn commit(
        &self,
        ledger: &mut Ledger,
        tickets: Vec<Ticket>,
        drafts: Vec<EventDraft>,
        at: DateTime<Utc>,
    ) -> Result<Vec<Event>, DeskError> {
        let staged = Staged {
            prior: tickets
                .into_iter()
                .map(|t| (t.id.clone(), ledger.store.upsert(t)))
                .collect(),
            log_mark: ledger.log.len(),
        };
        let events: Vec<Event> = drafts
            .into_iter()
            .map(|draft| ledger.log.append(draft, self.ids.event_id(), at))
            .collect();

        if let Err(err) = self.persistence.save(&ledger.view()) {
            warn!(error = %err, "save failed, rolling back");
            ledger.log.truncate(staged.log_mark);
            for (id, previous) in staged.prior.into_iter().rev() {
                ledger.store.restore(&id, previous);
            }
            return Err(err.into());
        }
        Ok(events)
    }

    fn fresh_ticket_id(&self, store: &TicketStore) -> Result<TicketId, DeskError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.ticket_id();
            if !store.contains(&id) {
                return Ok(id);
            }
            debug!(ticket = %id, "ticket id collision, regenerating");
        }
        Err(DeskError::IdSpaceExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    /// Create a ticket at version 1 with its SLA deadline derived.
    ///
    /// # Errors
    ///
    /// [`DeskError::Validation`] for an empty title or bad `sla_hours`;
    /// [`DeskError::Persistence`] if the save fails.
    pub fn create_ticket(&self, new: NewTicket) -> Result<Ticket, DeskError> {
        validate_title(&new.title)?;
        let sla_hours = new.sla_hours.unwrap_or(self.config.default_sla_hours);
        validate_sla_hours(sla_hours)?;

        let mut ledger = self.lock();
        let _store_lock = self.begin(&mut ledger)?;
        let now = self.clock.now();
        let id = self.fresh_ticket_id(&ledger.store)?;
        let sla_due = sla::due_at(now, sla_hours)
            .ok_or_else(|| DeskError::validation("sla_hours", "deadline is out of range"))?;
        let title = new.title.trim().to_string();

        let mut ticket = Ticket {
            id: id.clone(),
            version: 1,
            title: title.clone(),
            description: new.description,
            requester_id: new.requester_id.clone(),
            status: Status::Open,
            priority: new.priority,
            assignee_id: None,
            created_at: now,
            updated_at: now,
            sla_hours,
            sla_due: Some(sla_due),
            is_breached: false,
            comments: Vec::new(),
        };

        let mut drafts = vec![EventDraft::new(
            id.clone(),
            Some(new.requester_id.clone()),
            EventType::Created,
            Value::from(CreatedData {
                title: title.clone(),
                priority: new.priority,
                sla_hours,
                sla_due,
                msg: format!("{} created ticket \"{title}\"", new.requester_id),
            }),
        )];
        let transition = sla::evaluate(&ticket, now);
        drafts.extend(sla::apply_transition(&mut ticket, transition));

        self.commit(&mut ledger, vec![ticket.clone()], drafts, now)?;
        info!(ticket = %id, sla_due = %sla_due, "ticket created");
        Ok(ticket)
    }

    /// Version-gated update. See [`VersionedMutator::plan`].
    ///
    /// # Errors
    ///
    /// `NotFound`, `Conflict`, or `Validation` from planning (nothing is
    /// changed), or `Persistence` if the save fails (changes rolled back).
    pub fn apply(
        &self,
        id: &TicketId,
        changes: ChangeSet,
        expected_version: Option<u64>,
        ctx: &MutationContext,
    ) -> Result<Applied, DeskError> {
        let mut ledger = self.lock();
        let _store_lock = self.begin(&mut ledger)?;
        let now = self.clock.now();
        let fields = changes.changed_fields();

        let mutation = match self.mutator.plan(
            &ledger.store,
            id,
            changes,
            expected_version,
            ctx,
            now,
        ) {
            Ok(mutation) => mutation,
            Err(err) => {
                debug!(ticket = %id, error = %err, "mutation rejected");
                return Err(err);
            }
        };

        let ticket = mutation.ticket;
        let new_version = ticket.version;
        let events = self.commit(&mut ledger, vec![ticket.clone()], mutation.events, now)?;
        debug!(
            ticket = %id,
            version = new_version,
            event = %ctx.event_type,
            fields = ?fields,
            "mutation applied"
        );

        Ok(Applied {
            new_version,
            ticket,
            events,
        })
    }

    /// Change status, recorded as `status_changed`.
    ///
    /// # Errors
    ///
    /// Same as [`Desk::apply`].
    pub fn set_status(
        &self,
        id: &TicketId,
        status: Status,
        expected_version: Option<u64>,
        actor: Option<UserId>,
    ) -> Result<Applied, DeskError> {
        let ctx = MutationContext {
            actor,
            event_type: EventType::StatusChanged,
        };
        self.apply(id, ChangeSet::default().status(status), expected_version, &ctx)
    }

    /// Set or clear the assignee, recorded as `assigned`.
    ///
    /// # Errors
    ///
    /// Same as [`Desk::apply`].
    pub fn assign(
        &self,
        id: &TicketId,
        assignee: Option<UserId>,
        expected_version: Option<u64>,
        actor: Option<UserId>,
    ) -> Result<Applied, DeskError> {
        let ctx = MutationContext {
            actor,
            event_type: EventType::Assigned,
        };
        self.apply(
            id,
            ChangeSet::default().assignee(assignee),
            expected_version,
            &ctx,
        )
    }

    /// Record a change made outside the desk. No version check, no actor;
    /// any caller holding the old version will conflict afterwards.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Validation`, or `Persistence`.
    pub fn record_external_update(
        &self,
        id: &TicketId,
        changes: ChangeSet,
    ) -> Result<Applied, DeskError> {
        let ctx = MutationContext::default().recorded_as(EventType::ExternalUpdate);
        self.apply(id, changes, None, &ctx)
    }

    /// Append a comment. Comments do not bump the version.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty, oversized, or control-character body;
    /// `NotFound`; `Persistence`.
    pub fn add_comment(
        &self,
        id: &TicketId,
        author: UserId,
        body: &str,
    ) -> Result<Comment, DeskError> {
        validate_comment_body(body)?;

        let mut ledger = self.lock();
        let _store_lock = self.begin(&mut ledger)?;
        let now = self.clock.now();
        let mut ticket = ledger
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| DeskError::NotFound { id: id.clone() })?;

        let comment = Comment {
            author: author.clone(),
            body: body.to_string(),
            created_at: now,
        };
        ticket.comments.push(comment.clone());
        ticket.updated_at = now;

        let draft = EventDraft::new(
            id.clone(),
            Some(author.clone()),
            EventType::CommentAdded,
            Value::from(CommentData {
                body: body.to_string(),
                msg: format!("{author} commented"),
            }),
        );
        self.commit(&mut ledger, vec![ticket], vec![draft], now)?;
        debug!(ticket = %id, author = %author, "comment added");
        Ok(comment)
    }

    /// Append an arbitrary event for an existing ticket and persist it.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown ticket; `Persistence` if the save fails.
    pub fn append_event(
        &self,
        ticket_id: &TicketId,
        actor_id: Option<UserId>,
        event_type: EventType,
        data: Value,
    ) -> Result<Event, DeskError> {
        let mut ledger = self.lock();
        let _store_lock = self.begin(&mut ledger)?;
        if !ledger.store.contains(ticket_id) {
            return Err(DeskError::NotFound {
                id: ticket_id.clone(),
            });
        }
        let now = self.clock.now();
        let draft = EventDraft::new(ticket_id.clone(), actor_id, event_type, data);
        let mut events = self.commit(&mut ledger, Vec::new(), vec![draft], now)?;
        Ok(events.remove(0))
    }

    /// Re-evaluate every ticket's SLA at `now`.
    ///
    /// Returns the `sla_breached` events appended by this tick. Saves once,
    /// and only if some flag flipped.
    ///
    /// # Errors
    ///
    /// `Persistence` if the save fails. The tick's flips are rolled back, so
    /// the next tick detects them again.
    pub fn tick(&self, now: DateTime<Utc>) -> Result<Vec<Event>, DeskError> {
        let mut ledger = self.lock();
        let _store_lock = self.begin(&mut ledger)?;
        let plan = self.engine.plan_tick(&ledger.store, now);
        if plan.is_empty() {
            return Ok(Vec::new());
        }

        let flipped = plan.changed.len();
        let events = self.commit(&mut ledger, plan.changed, plan.events, now)?;
        for event in &events {
            info!(ticket = %event.ticket_id, "sla breached");
        }
        debug!(flipped, breaches = events.len(), "sla tick applied");
        Ok(events)
    }

    /// [`Desk::tick`] at the injected clock's current time.
    ///
    /// # Errors
    ///
    /// Same as [`Desk::tick`].
    pub fn tick_now(&self) -> Result<Vec<Event>, DeskError> {
        self.tick(self.clock.now())
    }

    /// Current copy of a ticket.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub fn ticket(&self, id: &TicketId) -> Result<Ticket, DeskError> {
        self.lock()
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| DeskError::NotFound { id: id.clone() })
    }

    /// Resolve a full id or a unique prefix of one (e.g. `hd-4f` or `4f`).
    ///
    /// # Errors
    ///
    /// `NotFound` if nothing matches; `Validation` if the prefix is ambiguous.
    pub fn resolve_id(&self, raw: &str) -> Result<TicketId, DeskError> {
        let ledger = self.lock();
        let exact = TicketId::new(raw);
        if ledger.store.contains(&exact) {
            return Ok(exact);
        }

        let candidates: Vec<&TicketId> = ledger
            .store
            .iter()
            .map(|t| &t.id)
            .filter(|id| {
                id.as_str().starts_with(raw)
                    || id
                        .as_str()
                        .split_once('-')
                        .is_some_and(|(_, rest)| rest.starts_with(raw))
            })
            .collect();

        match candidates.as_slice() {
            [] => Err(DeskError::NotFound { id: exact }),
            [only] => Ok((*only).clone()),
            many => Err(DeskError::validation(
                "id",
                format!("'{raw}' matches {} tickets; use a longer prefix", many.len()),
            )),
        }
    }

    #[must_use]
    pub fn list(&self, query: &TicketQuery) -> Page<Ticket> {
        query.run(self.lock().store.iter())
    }

    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary::of(self.lock().store.iter())
    }

    /// Events for one ticket, oldest first.
    #[must_use]
    pub fn events_for(&self, id: &TicketId) -> Vec<Event> {
        self.lock().log.for_ticket(id).cloned().collect()
    }

    /// The latest `limit` events across all tickets, newest first.
    #[must_use]
    pub fn recent_events(&self, limit: usize) -> Vec<Event> {
        self.lock().log.recent(limit).cloned().collect()
    }
}

fn validate_comment_body(body: &str) -> Result<(), DeskError> {
    if body.trim().is_empty() {
        return Err(DeskError::validation("body", "must not be empty"));
    }

    let chars = body.chars().count();
    if chars > MAX_COMMENT_BODY_CHARS {
        return Err(DeskError::validation(
            "body",
            format!("must be <= {MAX_COMMENT_BODY_CHARS} characters (got {chars})"),
        ));
    }

    if body
        .chars()
        .any(|ch| ch.is_control() && ch != '\n' && ch != '\t')
    {
        return Err(DeskError::validation(
            "body",
            "must not contain control characters",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::id::SequentialIds;
    use crate::model::Priority;
    use crate::store::MemoryPersistence;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single().expect("ts")
    }

    fn desk() -> (Desk, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(t0()));
        let desk = Desk::builder(MemoryPersistence::new())
            .clock(clock.clone())
            .ids(Arc::new(SequentialIds::new()))
            .open()
            .expect("open");
        (desk, clock)
    }

    #[test]
    fn create_sets_version_one_and_deadline() {
        let (desk, _clock) = desk();
        let ticket = desk
            .create_ticket(
                NewTicket::new("  Cannot login  ", "alice")
                    .priority(Priority::High)
                    .sla_hours(4.0),
            )
            .expect("create");

        assert_eq!(ticket.id.as_str(), "t-1");
        assert_eq!(ticket.title, "Cannot login");
        assert_eq!(ticket.version, 1);
        assert_eq!(ticket.status, Status::Open);
        assert_eq!(ticket.sla_due, Some(t0() + Duration::hours(4)));

        let events = desk.events_for(&ticket.id);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, EventType::Created);
        assert_eq!(events[0].actor_id, Some(UserId::new("alice")));
    }

    #[test]
    fn create_uses_configured_default_sla() {
        let desk = Desk::builder(MemoryPersistence::new())
            .clock(Arc::new(ManualClock::new(t0())))
            .config(DeskConfig {
                default_sla_hours: 8.0,
            })
            .open()
            .expect("open");
        let ticket = desk
            .create_ticket(NewTicket::new("x", "alice"))
            .expect("create");
        assert!((ticket.sla_hours - 8.0).abs() < f64::EPSILON);
        assert_eq!(ticket.sla_due, Some(t0() + Duration::hours(8)));
    }

    #[test]
    fn create_rejects_bad_input() {
        let (desk, _clock) = desk();
        assert!(matches!(
            desk.create_ticket(NewTicket::new(" ", "alice")),
            Err(DeskError::Validation { field: "title", .. })
        ));
        assert!(matches!(
            desk.create_ticket(NewTicket::new("x", "alice").sla_hours(0.0)),
            Err(DeskError::Validation {
                field: "sla_hours",
                ..
            })
        ));
        assert!(desk.list(&TicketQuery::default()).items.is_empty());
    }

    #[test]
    fn comment_does_not_bump_version() {
        let (desk, clock) = desk();
        let ticket = desk
            .create_ticket(NewTicket::new("x", "alice"))
            .expect("create");
        clock.advance(Duration::minutes(1));

        let comment = desk
            .add_comment(&ticket.id, UserId::new("bob"), "looking into it")
            .expect("comment");
        assert_eq!(comment.created_at, t0() + Duration::minutes(1));

        let after = desk.ticket(&ticket.id).expect("ticket");
        assert_eq!(after.version, 1);
        assert_eq!(after.updated_at, t0() + Duration::minutes(1));
        assert_eq!(after.latest_comment(), Some("looking into it"));

        let types: Vec<_> = desk
            .events_for(&ticket.id)
            .into_iter()
            .map(|e| e.event_type)
            .collect();
        assert_eq!(types, vec![EventType::Created, EventType::CommentAdded]);
    }

    #[test]
    fn comment_body_is_validated() {
        let (desk, _clock) = desk();
        let ticket = desk
            .create_ticket(NewTicket::new("x", "alice"))
            .expect("create");
        let author = UserId::new("bob");

        for body in ["", "   ", "bell\u{7}"] {
            assert!(matches!(
                desk.add_comment(&ticket.id, author.clone(), body),
                Err(DeskError::Validation { field: "body", .. })
            ));
        }
        let long = "a".repeat(MAX_COMMENT_BODY_CHARS + 1);
        assert!(desk.add_comment(&ticket.id, author.clone(), &long).is_err());
        assert!(
            desk.add_comment(&ticket.id, author, "line one\n\tline two")
                .is_ok()
        );
    }

    #[test]
    fn comment_on_unknown_ticket_is_not_found() {
        let (desk, _clock) = desk();
        let err = desk
            .add_comment(&TicketId::new("t-404"), UserId::new("bob"), "hi")
            .expect_err("missing");
        assert!(matches!(err, DeskError::NotFound { .. }));
    }

    #[test]
    fn append_event_requires_known_ticket() {
        let (desk, _clock) = desk();
        let err = desk
            .append_event(
                &TicketId::new("t-9"),
                None,
                EventType::ExternalUpdate,
                Value::Null,
            )
            .expect_err("missing");
        assert!(matches!(err, DeskError::NotFound { .. }));

        let ticket = desk
            .create_ticket(NewTicket::new("x", "alice"))
            .expect("create");
        let event = desk
            .append_event(
                &ticket.id,
                None,
                EventType::ExternalUpdate,
                serde_json::json!({"msg": "synced"}),
            )
            .expect("append");
        assert_eq!(event.summary(), "synced");
        assert_eq!(desk.ticket(&ticket.id).expect("ticket").version, 1);
    }

    #[test]
    fn external_update_bumps_version_without_check() {
        let (desk, _clock) = desk();
        let ticket = desk
            .create_ticket(NewTicket::new("x", "alice"))
            .expect("create");

        let applied = desk
            .record_external_update(&ticket.id, ChangeSet::default().description("synced"))
            .expect("external");
        assert_eq!(applied.new_version, 2);
        assert_eq!(applied.events[0].event_type, EventType::ExternalUpdate);
        assert_eq!(applied.events[0].actor_id, None);

        let err = desk
            .set_status(&ticket.id, Status::Pending, Some(1), Some(UserId::new("bob")))
            .expect_err("stale after external change");
        assert_eq!(err.current_version(), Some(2));
    }

    #[test]
    fn resolve_id_accepts_unique_prefixes() {
        let (desk, _clock) = desk();
        for n in 0..12 {
            desk.create_ticket(NewTicket::new(format!("ticket {n}"), "alice"))
                .expect("create");
        }
        assert_eq!(desk.resolve_id("t-5").expect("exact").as_str(), "t-5");
        assert_eq!(desk.resolve_id("5").expect("suffix").as_str(), "t-5");
        assert!(matches!(
            desk.resolve_id("1"),
            Err(DeskError::Validation { field: "id", .. })
        ));
        assert!(matches!(
            desk.resolve_id("t-99"),
            Err(DeskError::NotFound { .. })
        ));
    }

    #[test]
    fn open_repairs_stale_deadlines() {
        let persistence = MemoryPersistence::new();
        {
            let desk = Desk::builder(MemoryPersistence::new())
                .clock(Arc::new(ManualClock::new(t0())))
                .ids(Arc::new(SequentialIds::new()))
                .open()
                .expect("open");
            let mut ticket = desk
                .create_ticket(NewTicket::new("x", "alice").sla_hours(2.0))
                .expect("create");
            ticket.sla_due = Some(t0());
            persistence
                .save(&SnapshotView {
                    tickets: vec![&ticket],
                    events: &[],
                })
                .expect("seed");
        }

        let reopened = Desk::builder(persistence).open().expect("reopen");
        let ticket = reopened.ticket(&TicketId::new("t-1")).expect("ticket");
        assert_eq!(ticket.sla_due, Some(t0() + Duration::hours(2)));
    }
}
