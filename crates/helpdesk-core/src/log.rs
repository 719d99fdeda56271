//! Append-only, in-memory event log.
//!
//! The log never mutates or removes an appended event. The one exception is
//! [`EventLog::truncate`], used by the desk to undo the tail it appended
//! during an operation whose save failed; those events were never durable.

use chrono::{DateTime, Utc};

use crate::event::{Event, EventDraft};
use crate::model::{EventId, TicketId};

#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    #[must_use]
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Rebuild a log from persisted events, keeping their order.
    #[must_use]
    pub const fn from_events(events: Vec<Event>) -> Self {
        Self { events }
    }

    /// Append a drafted event and return the stored copy.
    pub fn append(&mut self, draft: EventDraft, id: EventId, at: DateTime<Utc>) -> Event {
        let event = Event {
            id,
            ticket_id: draft.ticket_id,
            actor_id: draft.actor_id,
            event_type: draft.event_type,
            data: draft.data,
            created_at: at,
        };
        self.events.push(event.clone());
        event
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub fn all(&self) -> &[Event] {
        &self.events
    }

    /// Events for one ticket in insertion order.
    pub fn for_ticket<'a>(&'a self, id: &'a TicketId) -> impl Iterator<Item = &'a Event> + 'a {
        self.events.iter().filter(move |e| &e.ticket_id == id)
    }

    /// The last `limit` events, newest first.
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &Event> {
        self.events.iter().rev().take(limit)
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.events.truncate(len);
    }
}
