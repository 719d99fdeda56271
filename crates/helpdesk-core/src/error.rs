use std::fmt;
use std::path::PathBuf;

use crate::lock::LockError;
use crate::model::TicketId;

/// Machine-readable error codes for callers that branch on failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotInitialized,
    ConfigParseError,
    TicketNotFound,
    VersionConflict,
    InvalidInput,
    InvalidEnumValue,
    IdSpaceExhausted,
    PersistenceFailed,
    LockContention,
    CorruptStore,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotInitialized => "E1001",
            Self::ConfigParseError => "E1002",
            Self::TicketNotFound => "E2001",
            Self::VersionConflict => "E2002",
            Self::InvalidInput => "E2003",
            Self::InvalidEnumValue => "E2004",
            Self::IdSpaceExhausted => "E2005",
            Self::PersistenceFailed => "E5001",
            Self::LockContention => "E5002",
            Self::CorruptStore => "E5003",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NotInitialized => "Project not initialized",
            Self::ConfigParseError => "Config file parse error",
            Self::TicketNotFound => "Ticket not found",
            Self::VersionConflict => "Ticket changed since it was read",
            Self::InvalidInput => "Invalid input",
            Self::InvalidEnumValue => "Invalid status/priority value",
            Self::IdSpaceExhausted => "Could not allocate a unique ticket id",
            Self::PersistenceFailed => "Backing store failed",
            Self::LockContention => "Lock contention",
            Self::CorruptStore => "Backing store is corrupt",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::NotInitialized => Some("Run `hd init` to initialize this directory."),
            Self::ConfigParseError => Some("Fix syntax in .helpdesk/config.toml and retry."),
            Self::TicketNotFound => None,
            Self::VersionConflict => {
                Some("Re-read the ticket and retry with its current version.")
            }
            Self::InvalidInput => None,
            Self::InvalidEnumValue => Some(
                "Use open|pending|resolved|closed for status and low|medium|high|urgent for priority.",
            ),
            Self::IdSpaceExhausted => Some("Retry; if persistent, check the id generator."),
            Self::PersistenceFailed => Some("Check disk space and write permissions."),
            Self::LockContention => Some("Retry after the other `hd` process releases its lock."),
            Self::CorruptStore => Some("Restore .helpdesk/store.json from a backup."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failures of the persistence collaborator.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store lock error: {0}")]
    Lock(#[from] LockError),

    #[error("store at {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("ticket {ticket} in store is invalid: {reason}")]
    InvalidRecord { ticket: TicketId, reason: String },

    #[error("failed to encode store: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl PersistenceError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Lock(err) => err.code(),
            Self::Corrupt { .. } | Self::InvalidRecord { .. } => ErrorCode::CorruptStore,
            Self::Io { .. } | Self::Encode(_) | Self::Unavailable(_) => {
                ErrorCode::PersistenceFailed
            }
        }
    }
}

/// Error taxonomy for every caller-facing desk operation.
///
/// `Conflict` and `Validation` are expected outcomes the caller recovers from
/// by re-reading or correcting input. `Persistence` is passed through as-is.
#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    #[error("ticket {id} not found")]
    NotFound { id: TicketId },

    #[error("ticket {id} is at version {current_version}, not {expected_version}")]
    Conflict {
        id: TicketId,
        expected_version: u64,
        current_version: u64,
    },

    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("no unused ticket id after {attempts} attempts")]
    IdSpaceExhausted { attempts: usize },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl DeskError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Machine-readable code associated with this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound { .. } => ErrorCode::TicketNotFound,
            Self::Conflict { .. } => ErrorCode::VersionConflict,
            Self::Validation { .. } => ErrorCode::InvalidInput,
            Self::IdSpaceExhausted { .. } => ErrorCode::IdSpaceExhausted,
            Self::Persistence(err) => err.code(),
        }
    }

    /// Optional remediation hint for operators.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }

    /// True for outcomes the caller is expected to handle and retry.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::Validation { .. })
    }

    /// Server-side version carried by a conflict, if this is one.
    #[must_use]
    pub const fn current_version(&self) -> Option<u64> {
        match self {
            Self::Conflict {
                current_version, ..
            } => Some(*current_version),
            _ => None,
        }
    }
}
