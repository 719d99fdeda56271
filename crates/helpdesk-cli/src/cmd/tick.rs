//! `hd tick`: run one SLA evaluation pass over every ticket.

use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use clap::Args;
use helpdesk_core::Event;
use helpdesk_core::sla::breach_due;
use serde::Serialize;

use crate::cmd::{Context, Project};
use crate::output::render;

#[derive(Args, Debug)]
pub struct TickArgs {
    /// Evaluate as of this RFC 3339 time instead of now.
    #[arg(long, value_parser = parse_rfc3339)]
    pub now: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct TickOutput {
    pub at: DateTime<Utc>,
    pub breached: Vec<Event>,
}

pub fn parse_rfc3339(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp like 2026-03-01T09:00:00Z: {e}"))
}

pub fn write_tick(w: &mut dyn Write, out: &TickOutput) -> io::Result<()> {
    if out.breached.is_empty() {
        return writeln!(w, "No new SLA breaches at {}", out.at.to_rfc3339());
    }
    for e in &out.breached {
        let due = breach_due(&e.data).map_or_else(|| "?".to_string(), |d| d.to_rfc3339());
        writeln!(w, "BREACHED {} (due {due})", e.ticket_id)?;
    }
    Ok(())
}

pub fn run_tick(args: &TickArgs, ctx: &Context, project_root: &Path) -> anyhow::Result<()> {
    let desk = Project::discover(project_root)?.open_desk()?;
    let at = args.now.unwrap_or_else(|| desk.now());
    let breached = desk.tick(at)?;
    render(ctx.output, &TickOutput { at, breached }, |o, w| write_tick(w, o))
}
