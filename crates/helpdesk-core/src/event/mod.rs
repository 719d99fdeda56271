//! Event data model for the ticket event log.
//!
//! Events are immutable once appended. Ordering is insertion order; the
//! `created_at` timestamp is informational and never used to reorder.

pub mod data;
pub mod types;

pub use data::{BreachData, ChangeData, CommentData, CreatedData};
pub use types::{EventType, UnknownEventType};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{EventId, TicketId, UserId};

/// A single entry in the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub ticket_id: TicketId,
    #[serde(default)]
    pub actor_id: Option<UserId>,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(default)]
    pub data: Value,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// The `msg` summary in the payload, or an empty string.
    #[must_use]
    pub fn summary(&self) -> &str {
        data::message(&self.data).unwrap_or_default()
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.created_at.to_rfc3339(),
            self.ticket_id,
            self.event_type,
            self.actor_id.as_ref().map_or("-", UserId::as_str),
        )
    }
}

/// An event that has been decided on but not yet given an id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub ticket_id: TicketId,
    pub actor_id: Option<UserId>,
    pub event_type: EventType,
    pub data: Value,
}

impl EventDraft {
    #[must_use]
    pub const fn new(
        ticket_id: TicketId,
        actor_id: Option<UserId>,
        event_type: EventType,
        data: Value,
    ) -> Self {
        Self {
            ticket_id,
            actor_id,
            event_type,
            data,
        }
    }
}
