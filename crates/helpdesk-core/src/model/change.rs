//! Sparse change sets for the versioned mutator.
//!
//! A field that is absent from a change set is left untouched. A field that is
//! present is written even when its new value is empty (`""`, `None`). The
//! two cases are kept apart by [`Patch`] rather than by sentinel values.

use serde_json::{Map, Value};

use super::{Priority, Status, UserId};

/// One field of a change set: either leave the stored value alone or set it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Patch<T> {
    #[default]
    Keep,
    Set(T),
}

impl<T> Patch<T> {
    #[must_use]
    pub const fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    #[must_use]
    pub const fn as_set(&self) -> Option<&T> {
        match self {
            Self::Keep => None,
            Self::Set(value) => Some(value),
        }
    }

    /// Write the patched value into `slot` if present. Returns whether it did.
    pub fn apply_to(self, slot: &mut T) -> bool {
        match self {
            Self::Keep => false,
            Self::Set(value) => {
                *slot = value;
                true
            }
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Keep, Self::Set)
    }
}

/// The set of fields a caller wants to change on one ticket.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChangeSet {
    pub title: Patch<String>,
    pub description: Patch<String>,
    pub priority: Patch<Priority>,
    pub status: Patch<Status>,
    pub assignee: Patch<Option<UserId>>,
    pub sla_hours: Patch<f64>,
}

impl ChangeSet {
    /// An empty change set. Applying it still bumps the version.
    #[must_use]
    pub fn touch() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Patch::Set(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Patch::Set(description.into());
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Patch::Set(priority);
        self
    }

    #[must_use]
    pub fn status(mut self, status: Status) -> Self {
        self.status = Patch::Set(status);
        self
    }

    #[must_use]
    pub fn assignee(mut self, assignee: Option<UserId>) -> Self {
        self.assignee = Patch::Set(assignee);
        self
    }

    #[must_use]
    pub fn sla_hours(mut self, hours: f64) -> Self {
        self.sla_hours = Patch::Set(hours);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    /// Names of the fields present in this change set, in a fixed order.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<&'static str> {
        [
            ("title", self.title.is_set()),
            ("description", self.description.is_set()),
            ("priority", self.priority.is_set()),
            ("status", self.status.is_set()),
            ("assignee_id", self.assignee.is_set()),
            ("sla_hours", self.sla_hours.is_set()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }

    /// JSON object of the present fields and their new values.
    #[must_use]
    pub fn to_json(&self) -> Map<String, Value> {
        fn put<T>(map: &mut Map<String, Value>, key: &str, patch: &Patch<T>)
        where
            T: Clone + Into<Value>,
        {
            if let Some(value) = patch.as_set() {
                map.insert(key.to_string(), value.clone().into());
            }
        }

        let mut map = Map::new();
        put(&mut map, "title", &self.title);
        put(&mut map, "description", &self.description);
        put(&mut map, "priority", &self.priority);
        put(&mut map, "status", &self.status);
        put(&mut map, "assignee_id", &self.assignee);
        put(&mut map, "sla_hours", &self.sla_hours);
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_change_set_has_no_fields() {
        let changes = ChangeSet::touch();
        assert!(changes.is_empty());
        assert!(changes.to_json().is_empty());
    }

    #[test]
    fn explicit_empty_values_count_as_present() {
        let changes = ChangeSet::default().description("").assignee(None);
        assert!(!changes.is_empty());
        assert_eq!(changes.changed_fields(), vec!["description", "assignee_id"]);

        let json = changes.to_json();
        assert_eq!(json.get("description"), Some(&Value::String(String::new())));
        assert_eq!(json.get("assignee_id"), Some(&Value::Null));
    }

    #[test]
    fn patch_apply_only_writes_when_set() {
        let mut slot = String::from("old");
        assert!(!Patch::<String>::Keep.apply_to(&mut slot));
        assert_eq!(slot, "old");
        assert!(Patch::Set(String::from("new")).apply_to(&mut slot));
        assert_eq!(slot, "new");
    }

    #[test]
    fn patch_from_option() {
        assert_eq!(Patch::from(Some(3)), Patch::Set(3));
        assert_eq!(Patch::<i32>::from(None), Patch::Keep);
    }

    #[test]
    fn json_uses_wire_names() {
        let json = ChangeSet::default()
            .status(Status::Resolved)
            .priority(Priority::Urgent)
            .sla_hours(1.5)
            .to_json();
        assert_eq!(json.get("status"), Some(&Value::from("resolved")));
        assert_eq!(json.get("priority"), Some(&Value::from("urgent")));
        assert_eq!(json.get("sla_hours"), Some(&Value::from(1.5)));
    }
}
