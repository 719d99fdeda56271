//! helpdesk-core library.
//!
//! A single-tenant ticket tracker built around two rules: every mutation is
//! gated on the ticket's version, and every SLA breach is reported once per
//! episode. Both write to one append-only event log.
//!
//! Start with [`Desk`]; everything else is the pieces it is made of.
//!
//! # Conventions
//!
//! - **Errors**: library operations return [`DeskError`]; configuration
//!   loading uses `anyhow::Result`.
//! - **Logging**: use `tracing` macros (`info!`, `warn!`, `debug!`).
//! - **Time**: all timestamps are `chrono::DateTime<Utc>` taken from a
//!   [`Clock`], never read directly inside the core.

pub mod clock;
pub mod config;
pub mod desk;
pub mod error;
pub mod event;
pub mod id;
pub mod lock;
pub mod log;
pub mod model;
pub mod mutate;
pub mod query;
pub mod sla;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{DeskConfig, ProjectConfig};
pub use desk::{Applied, Desk, DeskBuilder};
pub use error::{DeskError, ErrorCode, PersistenceError};
pub use event::{Event, EventType};
pub use id::{IdGenerator, RandomIds, SequentialIds};
pub use model::{ChangeSet, Comment, NewTicket, Patch, Priority, Status, Ticket, TicketId, UserId};
pub use mutate::MutationContext;
pub use query::{Page, Summary, TicketQuery};
pub use sla::SlaStatus;
pub use store::{JsonFilePersistence, MemoryPersistence, Persistence};
