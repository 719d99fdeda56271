//! Version-gated ticket mutation.
//!
//! The version is the only concurrency token. A caller that presents a stale
//! `expected_version` is rejected wholesale with [`DeskError::Conflict`] and
//! must re-read the ticket before retrying; there is no field-level merge.
//! Every accepted mutation, including an empty change set, bumps the version
//! by exactly one and records exactly one mutation event.
//!
//! Planning is pure: [`VersionedMutator::plan`] reads the store and returns
//! the new ticket plus event drafts. The desk stages and persists them under
//! its lock, so the check and the write are one uninterrupted sequence.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::DeskError;
use crate::event::{ChangeData, EventDraft, EventType};
use crate::model::{ChangeSet, Ticket, TicketId, UserId};
use crate::sla::{self, MAX_SLA_HOURS};
use crate::store::TicketStore;

/// Who is mutating, and under which event type the change is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationContext {
    pub actor: Option<UserId>,
    pub event_type: EventType,
}

impl Default for MutationContext {
    fn default() -> Self {
        Self {
            actor: None,
            event_type: EventType::Updated,
        }
    }
}

impl MutationContext {
    #[must_use]
    pub fn by(actor: impl Into<UserId>) -> Self {
        Self {
            actor: Some(actor.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn recorded_as(mut self, event_type: EventType) -> Self {
        self.event_type = event_type;
        self
    }
}

/// The planned outcome of one accepted mutation.
#[derive(Debug, Clone)]
pub struct Mutation {
    pub ticket: Ticket,
    /// The mutation event, followed by `sla_breached` if the change
    /// pushed the ticket past its deadline.
    pub events: Vec<EventDraft>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VersionedMutator;

impl VersionedMutator {
    /// Check `expected_version` against the stored ticket and plan the change.
    ///
    /// # Errors
    ///
    /// - [`DeskError::NotFound`] if no ticket has `id`.
    /// - [`DeskError::Conflict`] if `expected_version` is given and differs
    ///   from the stored version.
    /// - [`DeskError::Validation`] if a present field has an invalid value
    ///   or the context names a non-mutation event type.
    pub fn plan(
        &self,
        store: &TicketStore,
        id: &TicketId,
        changes: ChangeSet,
        expected_version: Option<u64>,
        ctx: &MutationContext,
        now: DateTime<Utc>,
    ) -> Result<Mutation, DeskError> {
        let current = store
            .get(id)
            .ok_or_else(|| DeskError::NotFound { id: id.clone() })?;

        match expected_version {
            Some(expected) if expected != current.version => {
                return Err(DeskError::Conflict {
                    id: id.clone(),
                    expected_version: expected,
                    current_version: current.version,
                });
            }
            _ => {}
        }

        if !ctx.event_type.is_mutation() {
            return Err(DeskError::validation(
                "event_type",
                format!("{} is not a mutation event", ctx.event_type),
            ));
        }
        validate_changes(&changes)?;

        let changed = changes.to_json();
        let msg = summarize(ctx, &changes);
        let mut ticket = current.clone();

        changes.title.apply_to(&mut ticket.title);
        changes.description.apply_to(&mut ticket.description);
        changes.priority.apply_to(&mut ticket.priority);
        changes.status.apply_to(&mut ticket.status);
        changes.assignee.apply_to(&mut ticket.assignee_id);
        let sla_changed = changes.sla_hours.apply_to(&mut ticket.sla_hours);

        ticket.version += 1;
        ticket.updated_at = now;

        let mut events = vec![EventDraft::new(
            ticket.id.clone(),
            ctx.actor.clone(),
            ctx.event_type,
            Value::from(ChangeData {
                version: ticket.version,
                changes: changed,
                msg,
            }),
        )];

        if sla_changed {
            let due = sla::due_at(ticket.created_at, ticket.sla_hours)
                .ok_or_else(|| DeskError::validation("sla_hours", "deadline is out of range"))?;
            ticket.sla_due = Some(due);
            let transition = sla::evaluate(&ticket, now);
            events.extend(sla::apply_transition(&mut ticket, transition));
        }

        Ok(Mutation { ticket, events })
    }
}

pub(crate) fn validate_title(title: &str) -> Result<(), DeskError> {
    if title.trim().is_empty() {
        return Err(DeskError::validation("title", "must not be empty"));
    }
    Ok(())
}

pub(crate) fn validate_sla_hours(hours: f64) -> Result<(), DeskError> {
    if !hours.is_finite() || hours <= 0.0 {
        return Err(DeskError::validation(
            "sla_hours",
            format!("must be a positive number of hours (got {hours})"),
        ));
    }
    if hours > MAX_SLA_HOURS {
        return Err(DeskError::validation(
            "sla_hours",
            format!("must be at most {MAX_SLA_HOURS} hours (got {hours})"),
        ));
    }
    Ok(())
}

fn validate_changes(changes: &ChangeSet) -> Result<(), DeskError> {
    if let Some(title) = changes.title.as_set() {
        validate_title(title)?;
    }
    if let Some(hours) = changes.sla_hours.as_set() {
        validate_sla_hours(*hours)?;
    }
    Ok(())
}

fn summarize(ctx: &MutationContext, changes: &ChangeSet) -> String {
    let who = ctx.actor.as_ref().map_or("someone", UserId::as_str);
    match ctx.event_type {
        EventType::StatusChanged => changes.status.as_set().map_or_else(
            || format!("{who} confirmed status"),
            |status| format!("Status -> {status}"),
        ),
        EventType::Assigned => match changes.assignee.as_set() {
            Some(Some(assignee)) => format!("{who} assigned to {assignee}"),
            Some(None) => format!("{who} unassigned ticket"),
            None => format!("{who} confirmed assignment"),
        },
        EventType::ExternalUpdate => "External system updated ticket".to_string(),
        _ => format!("{who} updated ticket"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Priority, Status};
    use crate::store::tests::ticket;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single().expect("ts")
    }

    fn store_with(version: u64) -> TicketStore {
        let mut t = ticket("t-1");
        t.version = version;
        [t].into_iter().collect()
    }

    fn id() -> TicketId {
        TicketId::new("t-1")
    }

    #[test]
    fn unknown_ticket_is_not_found() {
        let store = TicketStore::new();
        let err = VersionedMutator
            .plan(
                &store,
                &id(),
                ChangeSet::touch(),
                None,
                &MutationContext::default(),
                t0(),
            )
            .expect_err("missing");
        assert!(matches!(err, DeskError::NotFound { .. }));
    }

    #[test]
    fn stale_version_conflicts_with_current() {
        let store = store_with(4);
        let err = VersionedMutator
            .plan(
                &store,
                &id(),
                ChangeSet::default().status(Status::Closed),
                Some(3),
                &MutationContext::by("bob"),
                t0(),
            )
            .expect_err("stale");
        assert_eq!(err.current_version(), Some(4));
    }

    #[test]
    fn only_present_fields_change() {
        let store = store_with(1);
        let before = store.get(&id()).cloned().expect("ticket");
        let plan = VersionedMutator
            .plan(
                &store,
                &id(),
                ChangeSet::default().priority(Priority::Urgent),
                Some(1),
                &MutationContext::by("alice"),
                t0() + Duration::minutes(5),
            )
            .expect("plan");

        let after = plan.ticket;
        assert_eq!(after.priority, Priority::Urgent);
        assert_eq!(after.title, before.title);
        assert_eq!(after.status, before.status);
        assert_eq!(after.sla_due, before.sla_due);
        assert_eq!(after.version, 2);
        assert_eq!(after.updated_at, t0() + Duration::minutes(5));
        assert_eq!(plan.events.len(), 1);
        assert_eq!(plan.events[0].data["changes"]["priority"], "urgent");
        assert_eq!(plan.events[0].data["version"], 2);
    }

    #[test]
    fn no_expected_version_skips_check() {
        let store = store_with(7);
        let plan = VersionedMutator
            .plan(
                &store,
                &id(),
                ChangeSet::touch(),
                None,
                &MutationContext::default(),
                t0(),
            )
            .expect("plan");
        assert_eq!(plan.ticket.version, 8);
    }

    #[test]
    fn clearing_assignee_is_a_real_change() {
        let mut t = ticket("t-1");
        t.assignee_id = Some(UserId::new("bob"));
        let store: TicketStore = [t].into_iter().collect();

        let plan = VersionedMutator
            .plan(
                &store,
                &id(),
                ChangeSet::default().assignee(None),
                Some(1),
                &MutationContext::by("alice").recorded_as(EventType::Assigned),
                t0(),
            )
            .expect("plan");
        assert_eq!(plan.ticket.assignee_id, None);
        assert_eq!(plan.events[0].event_type, EventType::Assigned);
        assert_eq!(
            plan.events[0].data["msg"],
            "alice unassigned ticket"
        );
    }

    #[test]
    fn invalid_fields_are_rejected() {
        let store = store_with(1);
        for changes in [
            ChangeSet::default().title("   "),
            ChangeSet::default().sla_hours(0.0),
            ChangeSet::default().sla_hours(-2.0),
            ChangeSet::default().sla_hours(f64::NAN),
            ChangeSet::default().sla_hours(MAX_SLA_HOURS + 1.0),
        ] {
            let err = VersionedMutator
                .plan(
                    &store,
                    &id(),
                    changes,
                    Some(1),
                    &MutationContext::default(),
                    t0(),
                )
                .expect_err("invalid");
            assert!(matches!(err, DeskError::Validation { .. }), "{err}");
        }
    }

    #[test]
    fn non_mutation_event_type_is_rejected() {
        let store = store_with(1);
        let err = VersionedMutator
            .plan(
                &store,
                &id(),
                ChangeSet::touch(),
                None,
                &MutationContext::default().recorded_as(EventType::SlaBreached),
                t0(),
            )
            .expect_err("not a mutation");
        assert!(matches!(
            err,
            DeskError::Validation {
                field: "event_type",
                ..
            }
        ));
    }

    #[test]
    fn shortened_sla_breaches_within_the_same_plan() {
        let mut t = ticket("t-1");
        t.created_at = t0();
        t.sla_hours = 24.0;
        t.sla_due = sla::due_at(t0(), 24.0);
        let store: TicketStore = [t].into_iter().collect();

        let now = t0() + Duration::hours(3);
        let plan = VersionedMutator
            .plan(
                &store,
                &id(),
                ChangeSet::default().sla_hours(2.0),
                Some(1),
                &MutationContext::by("alice"),
                now,
            )
            .expect("plan");

        assert_eq!(plan.ticket.sla_due, Some(t0() + Duration::hours(2)));
        assert!(plan.ticket.is_breached);
        let types: Vec<_> = plan.events.iter().map(|e| e.event_type).collect();
        assert_eq!(types, vec![EventType::Updated, EventType::SlaBreached]);
    }

    #[test]
    fn extended_sla_clears_breach_silently() {
        let mut t = ticket("t-1");
        t.created_at = t0();
        t.sla_hours = 1.0;
        t.sla_due = sla::due_at(t0(), 1.0);
        t.is_breached = true;
        let store: TicketStore = [t].into_iter().collect();

        let plan = VersionedMutator
            .plan(
                &store,
                &id(),
                ChangeSet::default().sla_hours(48.0),
                None,
                &MutationContext::default(),
                t0() + Duration::hours(2),
            )
            .expect("plan");
        assert!(!plan.ticket.is_breached);
        assert_eq!(plan.events.len(), 1);
    }
}
