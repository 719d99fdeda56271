use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::{TicketId, UserId};

/// The four lifecycle states. Any state may move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Open,
    Pending,
    Resolved,
    Closed,
}

impl Status {
    pub const ALL: [Self; 4] = [Self::Open, Self::Pending, Self::Resolved, Self::Closed];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Pending => "pending",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }
}

/// Ticket priority as chosen by the requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Urgent];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

/// A single append-only comment on a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: UserId,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// The authoritative ticket record held by the ticket store.
///
/// `version`, `sla_due`, and `is_breached` are maintained by the desk; callers
/// only ever receive clones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub version: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub requester_id: UserId,
    pub status: Status,
    pub priority: Priority,
    #[serde(default)]
    pub assignee_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub sla_hours: f64,
    #[serde(default)]
    pub sla_due: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_breached: bool,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Ticket {
    /// Body of the most recent comment, if any.
    #[must_use]
    pub fn latest_comment(&self) -> Option<&str> {
        self.comments.last().map(|c| c.body.as_str())
    }

    /// Case-insensitive match over title, description, and latest comment.
    #[must_use]
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self
                .latest_comment()
                .is_some_and(|body| body.to_lowercase().contains(&needle))
    }
}

/// Caller input for creating a ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub requester_id: UserId,
    pub priority: Priority,
    /// Falls back to the configured default when `None`.
    pub sla_hours: Option<f64>,
}

impl NewTicket {
    #[must_use]
    pub fn new(title: impl Into<String>, requester_id: impl Into<UserId>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            requester_id: requester_id.into(),
            priority: Priority::default(),
            sla_hours: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub const fn sla_hours(mut self, hours: f64) -> Self {
        self.sla_hours = Some(hours);
        self
    }
}

/// Error returned when parsing a status or priority from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {expected}: '{got}'")]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Status> for serde_json::Value {
    fn from(status: Status) -> Self {
        Self::from(status.as_str())
    }
}

impl From<Priority> for serde_json::Value {
    fn from(priority: Priority) -> Self {
        Self::from(priority.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "pending" => Ok(Self::Pending),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            _ => Err(ParseEnumError {
                expected: "status",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(ParseEnumError {
                expected: "priority",
                got: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Ticket {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single().expect("valid ts");
        Ticket {
            id: TicketId::new("t-1"),
            version: 1,
            title: "Cannot login".into(),
            description: "Mobile login fails with error 401".into(),
            requester_id: UserId::new("alice"),
            status: Status::Open,
            priority: Priority::High,
            assignee_id: None,
            created_at: at,
            updated_at: at,
            sla_hours: 4.0,
            sla_due: None,
            is_breached: false,
            comments: vec![],
        }
    }

    #[test]
    fn status_parses_case_insensitively() {
        for status in Status::ALL {
            assert_eq!(status.as_str().parse::<Status>(), Ok(status));
            assert_eq!(status.as_str().to_uppercase().parse::<Status>(), Ok(status));
        }
        let err = "doing".parse::<Status>().expect_err("unknown status");
        assert_eq!(err.to_string(), "invalid status: 'doing'");
    }

    #[test]
    fn priority_defaults_to_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
        for priority in Priority::ALL {
            assert_eq!(priority.to_string().parse::<Priority>(), Ok(priority));
        }
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Status::Resolved).expect("serialize");
        assert_eq!(json, "\"resolved\"");
        let parsed: Priority = serde_json::from_str("\"urgent\"").expect("deserialize");
        assert_eq!(parsed, Priority::Urgent);
    }

    #[test]
    fn text_match_covers_latest_comment_only() {
        let mut ticket = sample();
        assert!(ticket.matches_text("LOGIN"));
        assert!(ticket.matches_text("401"));
        assert!(!ticket.matches_text("payment"));

        let at = ticket.created_at;
        ticket.comments.push(Comment {
            author: UserId::new("bob"),
            body: "payment gateway involved".into(),
            created_at: at,
        });
        assert!(ticket.matches_text("payment"));

        ticket.comments.push(Comment {
            author: UserId::new("bob"),
            body: "never mind".into(),
            created_at: at,
        });
        assert!(!ticket.matches_text("payment"));
        assert_eq!(ticket.latest_comment(), Some("never mind"));
    }

    #[test]
    fn missing_optional_fields_deserialize() {
        let json = r#"{
            "id": "t-9", "version": 2, "title": "x", "requester_id": "alice",
            "status": "pending", "priority": "low",
            "created_at": "2026-03-01T09:00:00Z", "updated_at": "2026-03-01T09:00:00Z",
            "sla_hours": 24.0
        }"#;
        let ticket: Ticket = serde_json::from_str(json).expect("deserialize");
        assert_eq!(ticket.sla_due, None);
        assert!(!ticket.is_breached);
        assert!(ticket.comments.is_empty());
        assert_eq!(ticket.assignee_id, None);
    }
}
