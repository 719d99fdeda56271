//! SLA deadline derivation and breach detection.
//!
//! A ticket's deadline is `created_at + sla_hours`. A ticket is breached iff
//! `now >= sla_due`. The engine does not poll silently: each evaluation
//! reports a [`Transition`], and only `Breach` produces an event. `Recover`
//! clears the flag without an event, so a later breach starts a new episode
//! and is reported again.
//!
//! Evaluation never bumps `version` or `updated_at`.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::event::{BreachData, EventDraft, EventType};
use crate::model::{Ticket, TicketId};
use crate::store::TicketStore;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Upper bound on `sla_hours` (ten years) to keep deadlines representable.
pub const MAX_SLA_HOURS: f64 = 87_600.0;

/// Deadline for a ticket created at `created_at` with an `hours` budget, or
/// `None` if the budget is not finite or the deadline is past chrono's range.
#[must_use]
pub fn due_at(created_at: DateTime<Utc>, hours: f64) -> Option<DateTime<Utc>> {
    if !hours.is_finite() {
        return None;
    }
    // `as` saturates; try_milliseconds rejects what saturated.
    #[allow(clippy::cast_possible_truncation)]
    let millis = (hours * MILLIS_PER_HOUR).round() as i64;
    created_at.checked_add_signed(Duration::try_milliseconds(millis)?)
}

/// Outcome of evaluating one ticket against a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// No deadline, or the flag already matches.
    Unchanged,
    /// Not breached → breached. Emits `sla_breached`.
    Breach { due: DateTime<Utc> },
    /// Breached → not breached, after the deadline moved forward.
    Recover,
}

/// Decide what should happen to `ticket`'s breach flag at `now`.
#[must_use]
pub fn evaluate(ticket: &Ticket, now: DateTime<Utc>) -> Transition {
    let Some(due) = ticket.sla_due else {
        return Transition::Unchanged;
    };
    match (ticket.is_breached, now >= due) {
        (false, true) => Transition::Breach { due },
        (true, false) => Transition::Recover,
        _ => Transition::Unchanged,
    }
}

/// Apply a transition to the ticket's flag and draft the event, if any.
pub fn apply_transition(ticket: &mut Ticket, transition: Transition) -> Option<EventDraft> {
    match transition {
        Transition::Unchanged => None,
        Transition::Breach { due } => {
            ticket.is_breached = true;
            Some(breach_event(ticket.id.clone(), due))
        }
        Transition::Recover => {
            ticket.is_breached = false;
            None
        }
    }
}

fn breach_event(ticket_id: TicketId, due: DateTime<Utc>) -> EventDraft {
    EventDraft::new(ticket_id, None, EventType::SlaBreached, Value::from(BreachData { due }))
}

/// Remaining-time view of a ticket's SLA for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaStatus {
    Unset,
    DueIn(Duration),
    Breached,
}

impl SlaStatus {
    /// A ticket flagged breached reads as breached whatever `now` is; the
    /// flag only clears when its deadline moves.
    #[must_use]
    pub fn of(ticket: &Ticket, now: DateTime<Utc>) -> Self {
        match ticket.sla_due {
            None => Self::Unset,
            Some(_) if ticket.is_breached => Self::Breached,
            Some(due) if now >= due => Self::Breached,
            Some(due) => Self::DueIn(due - now),
        }
    }
}

impl std::fmt::Display for SlaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unset => f.write_str("Due: -"),
            Self::Breached => f.write_str("Due: BREACHED"),
            Self::DueIn(left) => {
                let secs = left.num_seconds();
                write!(
                    f,
                    "Due in {}h {}m {}s",
                    secs / 3600,
                    (secs % 3600) / 60,
                    secs % 60
                )
            }
        }
    }
}

/// Result of one tick: tickets whose flag changed and the events to append.
#[derive(Debug, Clone, Default)]
pub struct TickPlan {
    pub changed: Vec<Ticket>,
    pub events: Vec<EventDraft>,
}

impl TickPlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }
}

/// Breach detector run over the whole store on each tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlaEngine;

impl SlaEngine {
    /// Evaluate every ticket at `now` without touching the store.
    ///
    /// The returned plan holds updated copies of the tickets whose flag
    /// flipped, in store order, and one breach event per `Breach`.
    #[must_use]
    pub fn plan_tick(&self, store: &TicketStore, now: DateTime<Utc>) -> TickPlan {
        let mut plan = TickPlan::default();
        for ticket in store.iter() {
            let transition = evaluate(ticket, now);
            if transition == Transition::Unchanged {
                continue;
            }
            let mut updated = ticket.clone();
            if let Some(event) = apply_transition(&mut updated, transition) {
                plan.events.push(event);
            }
            plan.changed.push(updated);
        }
        plan
    }
}

/// `due` field of an `sla_breached` payload, if present.
#[must_use]
pub fn breach_due(data: &Value) -> Option<DateTime<Utc>> {
    serde_json::from_value::<BreachData>(data.clone())
        .ok()
        .map(|b| b.due)
}
