//! `hd show`: one ticket with its SLA countdown, comments, and history.

use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use clap::Args;
use helpdesk_core::{Event, SlaStatus, Ticket, UserId};
use serde::Serialize;

use crate::cmd::{Context, open_ticket};
use crate::output::{kv, render, section};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Ticket id (a unique prefix works).
    pub id: String,
}

#[derive(Debug, Serialize)]
struct ShowOutput {
    #[serde(flatten)]
    ticket: Ticket,
    sla: String,
    events: Vec<Event>,
}

/// Human block for one ticket, shared by `create` and `show`.
pub fn write_ticket(w: &mut dyn Write, t: &Ticket, now: DateTime<Utc>) -> io::Result<()> {
    kv(w, "id", t.id.as_str())?;
    kv(w, "title", &t.title)?;
    kv(w, "status", t.status.as_str())?;
    kv(w, "priority", t.priority.as_str())?;
    kv(w, "version", t.version.to_string())?;
    kv(w, "requester", t.requester_id.as_str())?;
    kv(w, "assignee", t.assignee_id.as_ref().map_or("-", UserId::as_str))?;
    kv(w, "sla", format!("{}h", t.sla_hours))?;
    kv(w, "due", SlaStatus::of(t, now).to_string())?;
    if t.is_breached {
        kv(w, "breached", "yes")?;
    }
    if !t.description.is_empty() {
        writeln!(w)?;
        writeln!(w, "{}", t.description)?;
    }
    Ok(())
}

fn write_show(w: &mut dyn Write, out: &ShowOutput, now: DateTime<Utc>) -> io::Result<()> {
    writeln!(w, "{}", out.ticket.title)?;
    writeln!(w)?;
    write_ticket(w, &out.ticket, now)?;

    if !out.ticket.comments.is_empty() {
        writeln!(w)?;
        section(w, "Comments")?;
        for c in &out.ticket.comments {
            writeln!(w, "{} {}:", c.created_at.format("%Y-%m-%d %H:%M"), c.author)?;
            for line in c.body.lines() {
                writeln!(w, "  {line}")?;
            }
        }
    }

    writeln!(w)?;
    section(w, "History")?;
    for e in &out.events {
        let summary = e.summary();
        let detail = if summary.is_empty() {
            e.event_type.as_str()
        } else {
            summary
        };
        writeln!(
            w,
            "{}  {:<15} {}",
            e.created_at.format("%Y-%m-%d %H:%M"),
            e.event_type.as_str(),
            detail
        )?;
    }
    Ok(())
}

pub fn run_show(args: &ShowArgs, ctx: &Context, project_root: &Path) -> anyhow::Result<()> {
    let (desk, id) = open_ticket(project_root, &args.id)?;
    let ticket = desk.ticket(&id)?;
    let now = desk.now();
    let out = ShowOutput {
        sla: SlaStatus::of(&ticket, now).to_string(),
        events: desk.events_for(&id),
        ticket,
    };
    render(ctx.output, &out, |o, w| write_show(w, o, now))
}
