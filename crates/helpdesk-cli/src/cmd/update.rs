//! `hd update`, `hd touch`, and `hd external`: field edits through the
//! version-gated mutation path.
//!
//! `update` and `touch` take `--expect-version`; a stale value fails with a
//! `conflict` error carrying the current version. `external` records a
//! change made by another system and skips the check.

use std::io::{self, Write};
use std::path::Path;

use clap::Args;
use helpdesk_core::{Applied, ChangeSet, Event, MutationContext, Ticket};
use serde::Serialize;

use crate::cmd::{Context, FieldArgs, open_ticket};
use crate::output::{CliError, kv, render};

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Ticket id (a unique prefix works).
    pub id: String,

    #[command(flatten)]
    pub fields: FieldArgs,

    /// Version you last read. Omit to skip the concurrency check.
    #[arg(long)]
    pub expect_version: Option<u64>,
}

#[derive(Args, Debug)]
pub struct TouchArgs {
    /// Ticket id (a unique prefix works).
    pub id: String,

    /// Version you last read.
    #[arg(long)]
    pub expect_version: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ExternalArgs {
    /// Ticket id (a unique prefix works).
    pub id: String,

    #[command(flatten)]
    pub fields: FieldArgs,
}

/// JSON shape for every accepted mutation.
#[derive(Debug, Serialize)]
pub struct MutationOutput {
    pub id: String,
    pub new_version: u64,
    pub ticket: Ticket,
    pub events: Vec<Event>,
}

impl From<Applied> for MutationOutput {
    fn from(applied: Applied) -> Self {
        Self {
            id: applied.ticket.id.to_string(),
            new_version: applied.new_version,
            ticket: applied.ticket,
            events: applied.events,
        }
    }
}

fn write_mutation(w: &mut dyn Write, out: &MutationOutput) -> io::Result<()> {
    writeln!(w, "Updated {} to version {}", out.id, out.new_version)?;
    for e in &out.events {
        kv(w, e.event_type.as_str(), e.summary())?;
    }
    Ok(())
}

/// Render an accepted mutation in the current output mode.
pub fn render_applied(ctx: &Context, applied: Applied) -> anyhow::Result<()> {
    render(ctx.output, &MutationOutput::from(applied), |o, w| {
        write_mutation(w, o)
    })
}

pub fn run_update(args: &UpdateArgs, ctx: &Context, project_root: &Path) -> anyhow::Result<()> {
    let changes = args.fields.to_changes();
    if changes.is_empty() {
        return Err(CliError::with_details(
            "Nothing to update",
            "Pass at least one field flag, or use 'hd touch' to bump the version",
            "invalid_input",
        )
        .into());
    }

    let (desk, id) = open_ticket(project_root, &args.id)?;
    let mutation = MutationContext {
        actor: ctx.actor(),
        ..MutationContext::default()
    };
    let applied = desk.apply(&id, changes, args.expect_version, &mutation)?;
    render_applied(ctx, applied)
}

pub fn run_touch(args: &TouchArgs, ctx: &Context, project_root: &Path) -> anyhow::Result<()> {
    let (desk, id) = open_ticket(project_root, &args.id)?;
    let mutation = MutationContext {
        actor: ctx.actor(),
        ..MutationContext::default()
    };
    let applied = desk.apply(&id, ChangeSet::touch(), args.expect_version, &mutation)?;
    render_applied(ctx, applied)
}

pub fn run_external(args: &ExternalArgs, ctx: &Context, project_root: &Path) -> anyhow::Result<()> {
    let (desk, id) = open_ticket(project_root, &args.id)?;
    let applied = desk.record_external_update(&id, args.fields.to_changes())?;
    render_applied(ctx, applied)
}
