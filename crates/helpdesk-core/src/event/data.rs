//! Typed payload structs for each event kind.
//!
//! Events store their payload as free-form JSON. These structs are the shapes
//! the desk itself writes; readers should tolerate anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::model::Priority;

/// Payload for `created`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedData {
    pub title: String,
    pub priority: Priority,
    pub sla_hours: f64,
    pub sla_due: DateTime<Utc>,
    pub msg: String,
}

/// Payload for every event written by the versioned mutator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeData {
    pub version: u64,
    pub changes: Map<String, Value>,
    pub msg: String,
}

/// Payload for `comment_added`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentData {
    pub body: String,
    pub msg: String,
}

/// Payload for `sla_breached`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreachData {
    pub due: DateTime<Utc>,
}

impl From<CreatedData> for Value {
    fn from(data: CreatedData) -> Self {
        json!({
            "title": data.title,
            "priority": data.priority.as_str(),
            "sla_hours": data.sla_hours,
            "sla_due": data.sla_due,
            "msg": data.msg,
        })
    }
}

impl From<ChangeData> for Value {
    fn from(data: ChangeData) -> Self {
        json!({
            "version": data.version,
            "changes": Self::Object(data.changes),
            "msg": data.msg,
        })
    }
}

impl From<CommentData> for Value {
    fn from(data: CommentData) -> Self {
        json!({ "body": data.body, "msg": data.msg })
    }
}

impl From<BreachData> for Value {
    fn from(data: BreachData) -> Self {
        json!({ "due": data.due })
    }
}

/// Human summary line carried in `data.msg`, if any.
#[must_use]
pub fn message(data: &Value) -> Option<&str> {
    data.get("msg").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn breach_payload_carries_due_timestamp() {
        let due = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).single().expect("ts");
        let value = Value::from(BreachData { due });
        assert_eq!(value["due"], Value::from("2026-03-01T10:00:00Z"));

        let back: BreachData = serde_json::from_value(value).expect("roundtrip");
        assert_eq!(back.due, due);
    }

    #[test]
    fn message_reads_msg_field() {
        let value = Value::from(CommentData {
            body: "hi".into(),
            msg: "alice commented".into(),
        });
        assert_eq!(message(&value), Some("alice commented"));
        assert_eq!(message(&Value::Null), None);
        assert_eq!(message(&serde_json::json!({"msg": 3})), None);
    }

    #[test]
    fn payloads_read_back_as_their_structs() {
        let due = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).single().expect("ts");
        let created = CreatedData {
            title: "Printer on fire".into(),
            priority: Priority::Urgent,
            sla_hours: 1.5,
            sla_due: due,
            msg: "alice created ticket".into(),
        };
        let back: CreatedData =
            serde_json::from_value(Value::from(created.clone())).expect("created");
        assert_eq!(back, created);

        let mut changes = Map::new();
        changes.insert("priority".into(), Value::from(Priority::High));
        let change = ChangeData {
            version: 3,
            changes,
            msg: "bob updated priority".into(),
        };
        let value = Value::from(change.clone());
        assert_eq!(value["changes"]["priority"], "high");
        let back: ChangeData = serde_json::from_value(value).expect("change");
        assert_eq!(back, change);
    }
}
