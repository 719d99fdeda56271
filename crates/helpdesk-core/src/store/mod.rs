//! Ticket store and the persistence contract behind it.
//!
//! [`TicketStore`] is the authoritative in-memory map of tickets. It knows
//! nothing about durability; the desk hands a [`SnapshotView`] of the store
//! and the event log to a [`Persistence`] implementation after each change.
//!
//! A backend that other processes can write returns a [`StoreLock`] from
//! [`Persistence::lock`]. The desk holds it from reload to save, so each
//! version check sees every earlier write.

pub mod json;
pub mod memory;

pub use json::JsonFilePersistence;
pub use memory::MemoryPersistence;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::PersistenceError;
use crate::event::Event;
use crate::lock::StoreLock;
use crate::model::{Ticket, TicketId};

/// Owned persisted shape: `{tickets: [...], events: [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub tickets: Vec<Ticket>,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Borrowed view of the same shape, so saving never clones the ledger.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotView<'a> {
    pub tickets: Vec<&'a Ticket>,
    pub events: &'a [Event],
}

impl SnapshotView<'_> {
    #[must_use]
    pub fn to_owned_snapshot(&self) -> Snapshot {
        Snapshot {
            tickets: self.tickets.iter().map(|t| (*t).clone()).collect(),
            events: self.events.to_vec(),
        }
    }
}

/// Backing-store collaborator. Each save is all-or-nothing.
pub trait Persistence: Send + Sync {
    /// Take exclusive access for one load-check-save cycle.
    ///
    /// `None` means only this process writes the backend, so state loaded
    /// earlier is still current. `load` and `save` do not lock on their own.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if the lock cannot be taken in time.
    fn lock(&self) -> Result<Option<StoreLock>, PersistenceError> {
        Ok(None)
    }

    /// Load the full persisted state.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if the store cannot be read or decoded.
    fn load(&self) -> Result<Snapshot, PersistenceError>;

    /// Replace the persisted state with `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] if the write did not complete. The
    /// previously persisted state must then still be intact.
    fn save(&self, snapshot: &SnapshotView<'_>) -> Result<(), PersistenceError>;
}

impl<P: Persistence + ?Sized> Persistence for Arc<P> {
    fn lock(&self) -> Result<Option<StoreLock>, PersistenceError> {
        (**self).lock()
    }

    fn load(&self) -> Result<Snapshot, PersistenceError> {
        (**self).load()
    }

    fn save(&self, snapshot: &SnapshotView<'_>) -> Result<(), PersistenceError> {
        (**self).save(snapshot)
    }
}

/// Authoritative mapping of ticket id to ticket record.
#[derive(Debug, Clone, Default)]
pub struct TicketStore {
    tickets: BTreeMap<TicketId, Ticket>,
}

impl TicketStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tickets: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn get(&self, id: &TicketId) -> Option<&Ticket> {
        self.tickets.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &TicketId) -> bool {
        self.tickets.contains_key(id)
    }

    /// Insert or replace a ticket, returning the record it replaced.
    pub fn upsert(&mut self, ticket: Ticket) -> Option<Ticket> {
        self.tickets.insert(ticket.id.clone(), ticket)
    }

    /// Put back a previous record (or remove, if there was none).
    pub(crate) fn restore(&mut self, id: &TicketId, previous: Option<Ticket>) {
        match previous {
            Some(ticket) => {
                self.tickets.insert(id.clone(), ticket);
            }
            None => {
                self.tickets.remove(id);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ticket> {
        self.tickets.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}

impl FromIterator<Ticket> for TicketStore {
    fn from_iter<I: IntoIterator<Item = Ticket>>(iter: I) -> Self {
        let mut store = Self::new();
        for ticket in iter {
            store.upsert(ticket);
        }
        store
    }
}
