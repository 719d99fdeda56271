//! Ticket data model: identifiers, enums, the ticket record, and change sets.

pub mod change;
pub mod ticket;

pub use change::{ChangeSet, Patch};
pub use ticket::{Comment, NewTicket, ParseEnumError, Priority, Status, Ticket};

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_string())
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for serde_json::Value {
            fn from(id: $name) -> Self {
                Self::String(id.0)
            }
        }
    };
}

string_id!(
    /// Opaque, immutable ticket identifier.
    TicketId
);

string_id!(
    /// Weak reference to a user. The core never resolves it.
    UserId
);

string_id!(
    /// Identifier of a single event in the log.
    EventId
);
