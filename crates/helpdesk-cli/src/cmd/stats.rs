//! `hd stats`: dashboard counts.

use std::io::{self, Write};
use std::path::Path;

use clap::Args;
use helpdesk_core::Summary;

use crate::cmd::{Context, Project};
use crate::output::{kv, render, section};

#[derive(Args, Debug)]
pub struct StatsArgs {}

fn write_stats(w: &mut dyn Write, s: &Summary) -> io::Result<()> {
    section(w, "Helpdesk")?;
    kv(w, "total", s.total.to_string())?;
    kv(w, "open", s.open.to_string())?;
    kv(w, "assigned", s.assigned.to_string())?;
    kv(w, "breached", s.breached.to_string())
}

pub fn run_stats(_args: &StatsArgs, ctx: &Context, project_root: &Path) -> anyhow::Result<()> {
    let desk = Project::discover(project_root)?.open_desk()?;
    render(ctx.output, &desk.summary(), |s, w| write_stats(w, s))
}
