//! `hd log`: the event trail for one ticket, or the latest events overall.

use std::io::{self, Write};
use std::path::Path;

use clap::Args;
use helpdesk_core::Event;

use crate::cmd::{Context, Project};
use crate::output::render;

#[derive(Args, Debug)]
pub struct LogArgs {
    /// Restrict to one ticket (a unique prefix works).
    pub id: Option<String>,

    /// Maximum number of events when no ticket is given.
    #[arg(long, short = 'n', default_value_t = 20)]
    pub limit: usize,
}

fn write_events(w: &mut dyn Write, events: &[Event]) -> io::Result<()> {
    if events.is_empty() {
        return writeln!(w, "No events.");
    }
    for e in events {
        writeln!(w, "{e}")?;
    }
    Ok(())
}

pub fn run_log(args: &LogArgs, ctx: &Context, project_root: &Path) -> anyhow::Result<()> {
    let desk = Project::discover(project_root)?.open_desk()?;
    let events = match &args.id {
        Some(raw) => {
            let id = desk.resolve_id(raw)?;
            desk.events_for(&id)
        }
        None => desk.recent_events(args.limit),
    };
    render(ctx.output, &events, |e, w| write_events(w, e))
}
