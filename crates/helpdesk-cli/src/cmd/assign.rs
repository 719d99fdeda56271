//! `hd assign`: set or clear a ticket's assignee.

use std::path::Path;

use clap::Args;
use helpdesk_core::UserId;

use crate::cmd::update::render_applied;
use crate::cmd::{Context, open_ticket};
use crate::output::CliError;

#[derive(Args, Debug)]
pub struct AssignArgs {
    /// Ticket id (a unique prefix works).
    pub id: String,

    /// User to assign.
    #[arg(conflicts_with = "clear")]
    pub user: Option<String>,

    /// Remove the current assignee.
    #[arg(long)]
    pub clear: bool,

    /// Version you last read.
    #[arg(long)]
    pub expect_version: Option<u64>,
}

pub fn run_assign(args: &AssignArgs, ctx: &Context, project_root: &Path) -> anyhow::Result<()> {
    let assignee = match (&args.user, args.clear) {
        (Some(user), false) if !user.is_empty() => Some(UserId::new(user.as_str())),
        (None, true) => None,
        _ => {
            return Err(CliError::with_details(
                "Give a user to assign or --clear",
                "hd assign <id> <user>  |  hd assign <id> --clear",
                "invalid_input",
            )
            .into());
        }
    };

    let (desk, id) = open_ticket(project_root, &args.id)?;
    let applied = desk.assign(&id, assignee, args.expect_version, ctx.actor())?;
    render_applied(ctx, applied)
}
