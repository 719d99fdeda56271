//! `hd list`: filtered, paginated ticket listing, newest first.

use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use clap::Args;
use helpdesk_core::query::DEFAULT_PAGE_SIZE;
use helpdesk_core::{Page, SlaStatus, Status, Ticket, TicketQuery, UserId};

use crate::cmd::{Context, Project};
use crate::output::render;

const TITLE_WIDTH: usize = 36;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Case-insensitive text over title, description, and latest comment.
    #[arg(long, short)]
    pub query: Option<String>,

    /// Only tickets in this status.
    #[arg(long, short)]
    pub status: Option<Status>,

    /// 1-based page number.
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Tickets per page.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub per_page: usize,
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let cut: String = s.chars().take(width.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

fn write_page(w: &mut dyn Write, page: &Page<Ticket>, now: DateTime<Utc>) -> io::Result<()> {
    if page.items.is_empty() {
        return writeln!(w, "No tickets.");
    }

    writeln!(
        w,
        "{:<10} {:<9} {:<7} {:<title$} {:<10} DUE",
        "ID",
        "STATUS",
        "PRIO",
        "TITLE",
        "ASSIGNEE",
        title = TITLE_WIDTH
    )?;
    for t in &page.items {
        writeln!(
            w,
            "{:<10} {:<9} {:<7} {:<title$} {:<10} {}",
            t.id.as_str(),
            t.status.as_str(),
            t.priority.as_str(),
            truncate(&t.title, TITLE_WIDTH),
            t.assignee_id.as_ref().map_or("-", UserId::as_str),
            SlaStatus::of(t, now),
            title = TITLE_WIDTH
        )?;
    }
    writeln!(
        w,
        "\nPage {} of {} ({} tickets)",
        page.page, page.pages, page.total
    )
}

pub fn run_list(args: &ListArgs, ctx: &Context, project_root: &Path) -> anyhow::Result<()> {
    let desk = Project::discover(project_root)?.open_desk()?;
    let query = TicketQuery {
        text: args.query.clone().filter(|q| !q.trim().is_empty()),
        status: args.status,
        page: args.page,
        per_page: args.per_page,
    };
    let page = desk.list(&query);
    let now = desk.now();
    render(ctx.output, &page, |p, w| write_page(w, p, now))
}
