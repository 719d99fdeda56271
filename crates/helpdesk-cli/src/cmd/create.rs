//! `hd create`: open a new ticket at version 1.

use std::path::Path;

use clap::Args;
use helpdesk_core::{NewTicket, Priority, UserId};

use crate::cmd::show::write_ticket;
use crate::cmd::{Context, Project};
use crate::output::render;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Ticket title.
    #[arg(long, short)]
    pub title: String,

    /// Longer description.
    #[arg(long, short, default_value = "")]
    pub description: String,

    /// Priority (low, medium, high, urgent).
    #[arg(long, short, default_value_t = Priority::Medium)]
    pub priority: Priority,

    /// SLA budget in hours. Defaults to `sla.default_hours` from config.
    #[arg(long)]
    pub sla_hours: Option<f64>,

    /// Who the ticket is for. Defaults to the acting user.
    #[arg(long)]
    pub requester: Option<String>,
}

pub fn run_create(args: &CreateArgs, ctx: &Context, project_root: &Path) -> anyhow::Result<()> {
    let requester = match &args.requester {
        Some(requester) if !requester.is_empty() => UserId::new(requester.as_str()),
        _ => ctx.require_actor()?,
    };

    let desk = Project::discover(project_root)?.open_desk()?;
    let mut new = NewTicket::new(args.title.as_str(), requester)
        .description(args.description.as_str())
        .priority(args.priority);
    if let Some(hours) = args.sla_hours {
        new = new.sla_hours(hours);
    }

    let ticket = desk.create_ticket(new)?;
    let now = desk.now();
    render(ctx.output, &ticket, |t, w| {
        writeln!(w, "Created {}", t.id)?;
        write_ticket(w, t, now)
    })
}
