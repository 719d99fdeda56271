//! Command handlers. Each submodule owns its clap `Args` and a `run_*` entry
//! point taking the parsed args, the [`Context`], and the project root.

pub mod assign;
pub mod comment;
pub mod create;
pub mod init;
pub mod list;
pub mod log;
pub mod show;
pub mod stats;
pub mod status;
pub mod tick;
pub mod update;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use helpdesk_core::config::{self, PROJECT_DIR, UserConfig};
use helpdesk_core::{
    ChangeSet, Desk, ErrorCode, JsonFilePersistence, Priority, ProjectConfig, RandomIds, Status,
    SystemClock, TicketId, UserId,
};

use crate::actor;
use crate::output::{CliError, OutputMode, error_slug};

/// Global invocation state shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub output: OutputMode,
    actor_flag: Option<String>,
    user: UserConfig,
}

impl Context {
    pub const fn new(output: OutputMode, actor_flag: Option<String>, user: UserConfig) -> Self {
        Self {
            output,
            actor_flag,
            user,
        }
    }

    /// The acting user, if one can be resolved.
    pub fn actor(&self) -> Option<UserId> {
        actor::resolve_actor(self.actor_flag.as_deref(), self.user.actor.as_deref())
            .map(UserId::from)
    }

    /// The acting user, or a `missing_actor` error.
    pub fn require_actor(&self) -> anyhow::Result<UserId> {
        Ok(actor::require_actor(self.actor_flag.as_deref(), self.user.actor.as_deref())
            .map(UserId::from)?)
    }
}

/// An initialized project: its `.helpdesk` directory and loaded config.
#[derive(Debug, Clone)]
pub struct Project {
    pub dir: PathBuf,
    pub config: ProjectConfig,
}

impl Project {
    /// Find the enclosing project and load its config.
    pub fn discover(start: &Path) -> anyhow::Result<Self> {
        let dir = find_helpdesk_dir(start).ok_or_else(|| {
            CliError::with_details(
                "Not a helpdesk project: .helpdesk directory not found",
                ErrorCode::NotInitialized.hint().unwrap_or_default(),
                error_slug(ErrorCode::NotInitialized),
            )
        })?;

        let root = dir.parent().unwrap_or(&dir);
        let config = config::load_project_config(root).map_err(|err| {
            CliError::with_details(
                format!("{err:#}"),
                ErrorCode::ConfigParseError.hint().unwrap_or_default(),
                error_slug(ErrorCode::ConfigParseError),
            )
        })?;

        Ok(Self { dir, config })
    }

    pub fn persistence(&self) -> JsonFilePersistence {
        JsonFilePersistence::new(&self.dir, self.config.store.lock_timeout())
    }

    /// Open a desk over this project's JSON store.
    pub fn open_desk(&self) -> anyhow::Result<Desk> {
        let desk = Desk::builder(self.persistence())
            .clock(Arc::new(SystemClock))
            .ids(Arc::new(RandomIds))
            .config(self.config.desk())
            .open()?;
        Ok(desk)
    }
}

/// Find the `.helpdesk` directory by walking up from `start`.
pub fn find_helpdesk_dir(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(PROJECT_DIR);
        if candidate.is_dir() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Discover the project, open its desk, and resolve `raw` to a ticket id.
pub fn open_ticket(project_root: &Path, raw: &str) -> anyhow::Result<(Desk, TicketId)> {
    let desk = Project::discover(project_root)?.open_desk()?;
    let id = desk.resolve_id(raw)?;
    Ok((desk, id))
}

/// Field flags shared by `update` and `external`.
#[derive(Args, Debug, Default, Clone)]
pub struct FieldArgs {
    /// New title.
    #[arg(long)]
    pub title: Option<String>,

    /// New description.
    #[arg(long)]
    pub description: Option<String>,

    /// New priority (low, medium, high, urgent).
    #[arg(long)]
    pub priority: Option<Priority>,

    /// New status (open, pending, resolved, closed).
    #[arg(long)]
    pub status: Option<Status>,

    /// New SLA budget in hours; the deadline is recomputed from creation time.
    #[arg(long)]
    pub sla_hours: Option<f64>,
}

impl FieldArgs {
    pub fn to_changes(&self) -> ChangeSet {
        let mut changes = ChangeSet::default();
        if let Some(title) = &self.title {
            changes = changes.title(title.clone());
        }
        if let Some(description) = &self.description {
            changes = changes.description(description.clone());
        }
        if let Some(priority) = self.priority {
            changes = changes.priority(priority);
        }
        if let Some(status) = self.status {
            changes = changes.status(status);
        }
        if let Some(hours) = self.sla_hours {
            changes = changes.sla_hours(hours);
        }
        changes
    }
}
