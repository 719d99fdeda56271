//! Event type enum covering the seven ticket event kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The event catalog. String forms are the snake_case names stored in the
/// persisted log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A ticket was created.
    Created,
    /// Fields changed through the versioned mutator.
    Updated,
    /// Status changed.
    StatusChanged,
    /// Assignee set or cleared.
    Assigned,
    /// A comment was appended.
    CommentAdded,
    /// The SLA deadline passed (once per breach episode).
    SlaBreached,
    /// A change made by a system outside this desk.
    ExternalUpdate,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "unknown event type '{raw}': expected one of created, updated, status_changed, \
     assigned, comment_added, sla_breached, external_update"
)]
pub struct UnknownEventType {
    pub raw: String,
}

impl EventType {
    pub const ALL: [Self; 7] = [
        Self::Created,
        Self::Updated,
        Self::StatusChanged,
        Self::Assigned,
        Self::CommentAdded,
        Self::SlaBreached,
        Self::ExternalUpdate,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::StatusChanged => "status_changed",
            Self::Assigned => "assigned",
            Self::CommentAdded => "comment_added",
            Self::SlaBreached => "sla_breached",
            Self::ExternalUpdate => "external_update",
        }
    }

    /// Whether the versioned mutator may record a mutation under this type.
    #[must_use]
    pub const fn is_mutation(self) -> bool {
        matches!(
            self,
            Self::Updated | Self::StatusChanged | Self::Assigned | Self::ExternalUpdate
        )
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|et| et.as_str() == s)
            .ok_or_else(|| UnknownEventType { raw: s.to_string() })
    }
}
