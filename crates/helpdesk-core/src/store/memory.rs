use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use super::{Persistence, Snapshot, SnapshotView};
use crate::error::PersistenceError;

/// In-process persistence, used by tests and embedders without a disk.
///
/// Saves can be switched to fail on demand to exercise rollback paths.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    saved: Mutex<Snapshot>,
    failing: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryPersistence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot, as if it had been saved earlier.
    #[must_use]
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            saved: Mutex::new(snapshot),
            ..Self::default()
        }
    }

    /// Make every following save fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Copy of the last successfully saved state.
    #[must_use]
    pub fn saved(&self) -> Snapshot {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Persistence for MemoryPersistence {
    fn load(&self) -> Result<Snapshot, PersistenceError> {
        Ok(self.saved())
    }

    fn save(&self, snapshot: &SnapshotView<'_>) -> Result<(), PersistenceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable(
                "memory store is set to fail".into(),
            ));
        }
        *self.saved.lock().unwrap_or_else(PoisonError::into_inner) = snapshot.to_owned_snapshot();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
