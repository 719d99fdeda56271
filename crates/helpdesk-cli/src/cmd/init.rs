//! `hd init`: create `.helpdesk/` with a default config and an empty store.

use std::fs;
use std::path::Path;

use clap::Args;
use helpdesk_core::config::{self, PROJECT_DIR};
use helpdesk_core::store::{Persistence, SnapshotView};
use serde::Serialize;
use tracing::info;

use crate::cmd::{Context, Project};
use crate::output::{CliError, kv, render};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite config.toml if the project already exists. Tickets are kept.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct InitOutput {
    path: String,
    config: String,
    store: String,
    reinitialized: bool,
}

pub fn run_init(args: &InitArgs, ctx: &Context, project_root: &Path) -> anyhow::Result<()> {
    let dir = project_root.join(PROJECT_DIR);
    let existed = dir.is_dir();
    if existed && !args.force {
        return Err(CliError::with_details(
            format!("{} already exists", dir.display()),
            "Use 'hd init --force' to rewrite config.toml",
            "already_initialized",
        )
        .into());
    }

    fs::create_dir_all(&dir)?;
    let config_path = dir.join("config.toml");
    fs::write(&config_path, config::default_config_toml())?;

    let project = Project::discover(project_root)?;
    let store = project.persistence();
    let store_lock = store.lock()?;
    if !store.store_path().exists() {
        store.save(&SnapshotView {
            tickets: Vec::new(),
            events: &[],
        })?;
    }
    drop(store_lock);
    info!(path = %dir.display(), "initialized helpdesk project");

    let out = InitOutput {
        path: dir.display().to_string(),
        config: config_path.display().to_string(),
        store: store.store_path().display().to_string(),
        reinitialized: existed,
    };
    render(ctx.output, &out, |o, w| {
        if o.reinitialized {
            writeln!(w, "Reinitialized helpdesk project")?;
        } else {
            writeln!(w, "Initialized helpdesk project")?;
        }
        kv(w, "path", &o.path)?;
        kv(w, "config", &o.config)?;
        kv(w, "store", &o.store)
    })
}
