//! JSON file persistence.
//!
//! # Layout
//!
//! ```text
//! .helpdesk/
//!   store.json      # {"tickets": [...], "events": [...]}
//!   store.lock      # advisory lock, held by a desk from reload to save
//! ```
//!
//! Saves write `store.json.tmp`, flush it to disk, then rename it over
//! `store.json`, so a reader never sees a half-written file.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use super::{Persistence, Snapshot, SnapshotView};
use crate::error::PersistenceError;
use crate::lock::StoreLock;

pub const STORE_FILE: &str = "store.json";
pub const LOCK_FILE: &str = "store.lock";

#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    dir: PathBuf,
    lock_timeout: Duration,
}

impl JsonFilePersistence {
    /// Persist into `dir` (normally the `.helpdesk` directory).
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, lock_timeout: Duration) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout,
        }
    }

    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.dir.join(STORE_FILE)
    }

    #[must_use]
    pub fn lock_path(&self) -> PathBuf {
        self.dir.join(LOCK_FILE)
    }

    fn tmp_path(&self) -> PathBuf {
        self.dir.join(format!("{STORE_FILE}.tmp"))
    }
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> PersistenceError + '_ {
    move |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl Persistence for JsonFilePersistence {
    fn lock(&self) -> Result<Option<StoreLock>, PersistenceError> {
        Ok(Some(StoreLock::acquire(
            &self.lock_path(),
            self.lock_timeout,
        )?))
    }

    fn load(&self) -> Result<Snapshot, PersistenceError> {
        let path = self.store_path();

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no store file yet, starting empty");
                return Ok(Snapshot::default());
            }
            Err(err) => return Err(io_err(&path)(err)),
        };

        if content.trim().is_empty() {
            return Ok(Snapshot::default());
        }

        serde_json::from_str(&content).map_err(|source| PersistenceError::Corrupt {
            path: path.clone(),
            source,
        })
    }

    fn save(&self, snapshot: &SnapshotView<'_>) -> Result<(), PersistenceError> {
        let path = self.store_path();
        let tmp = self.tmp_path();

        let mut bytes = serde_json::to_vec_pretty(snapshot)?;
        bytes.push(b'\n');

        let mut file = File::create(&tmp).map_err(io_err(&tmp))?;
        file.write_all(&bytes).map_err(io_err(&tmp))?;
        file.sync_all().map_err(io_err(&tmp))?;
        drop(file);

        fs::rename(&tmp, &path).map_err(io_err(&path))?;
        debug!(
            path = %path.display(),
            tickets = snapshot.tickets.len(),
            events = snapshot.events.len(),
            "store saved"
        );
        Ok(())
    }
}
