//! `hd status`: move a ticket through open → pending → resolved → closed.
//! Any transition is allowed, including reopening.

use std::path::Path;

use clap::Args;
use helpdesk_core::Status;

use crate::cmd::update::render_applied;
use crate::cmd::{Context, open_ticket};

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Ticket id (a unique prefix works).
    pub id: String,

    /// Target status (open, pending, resolved, closed).
    pub status: Status,

    /// Version you last read.
    #[arg(long)]
    pub expect_version: Option<u64>,
}

pub fn run_status(args: &StatusArgs, ctx: &Context, project_root: &Path) -> anyhow::Result<()> {
    let (desk, id) = open_ticket(project_root, &args.id)?;
    let applied = desk.set_status(&id, args.status, args.expect_version, ctx.actor())?;
    render_applied(ctx, applied)
}
