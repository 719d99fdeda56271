//! Identifier generation collaborator.

use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::model::{EventId, TicketId};

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub trait IdGenerator: Send + Sync {
    fn ticket_id(&self) -> TicketId;
    fn event_id(&self) -> EventId;
}

/// Deterministic ids: `t-1`, `t-2`, … and `ev-1`, `ev-2`, ….
#[derive(Debug)]
pub struct SequentialIds {
    tickets: AtomicU64,
    events: AtomicU64,
}

impl SequentialIds {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tickets: AtomicU64::new(1),
            events: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn ticket_id(&self) -> TicketId {
        TicketId::new(format!("t-{}", self.tickets.fetch_add(1, Ordering::Relaxed)))
    }

    fn event_id(&self) -> EventId {
        EventId::new(format!("ev-{}", self.events.fetch_add(1, Ordering::Relaxed)))
    }
}

/// Random base36 ids: `hd-xxxxxx` for tickets, `ev-xxxxxxxxxx` for events.
///
/// Ticket ids are short enough to type; the desk regenerates on collision.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl RandomIds {
    pub const TICKET_LEN: usize = 6;
    pub const EVENT_LEN: usize = 10;
}

fn random_base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(BASE36[rng.gen_range(0..BASE36.len())]))
        .collect()
}

impl IdGenerator for RandomIds {
    fn ticket_id(&self) -> TicketId {
        TicketId::new(format!("hd-{}", random_base36(Self::TICKET_LEN)))
    }

    fn event_id(&self) -> EventId {
        EventId::new(format!("ev-{}", random_base36(Self::EVENT_LEN)))
    }
}
