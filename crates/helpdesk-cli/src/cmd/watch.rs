//! `hd watch`: the periodic SLA driver.
//!
//! Each iteration reopens the desk so changes made by other `hd` processes
//! are seen, then ticks at the current time. A failed tick is logged and
//! retried on the next iteration; nothing it staged is kept.

use std::path::Path;
use std::thread;
use std::time::Duration;

use clap::Args;
use tracing::{info, warn};

use crate::cmd::tick::{TickOutput, write_tick};
use crate::cmd::{Context, Project};
use crate::output::render;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Seconds between ticks. Defaults to `watch.interval_secs` from config.
    #[arg(long)]
    pub interval: Option<u64>,

    /// Stop after this many ticks. Runs until interrupted when omitted.
    #[arg(long)]
    pub iterations: Option<u64>,
}

fn tick_once(project: &Project, ctx: &Context) -> anyhow::Result<usize> {
    let desk = project.open_desk()?;
    let at = desk.now();
    let breached = desk.tick(at)?;
    let count = breached.len();
    if count > 0 || ctx.output.is_json() {
        render(ctx.output, &TickOutput { at, breached }, |o, w| write_tick(w, o))?;
    }
    Ok(count)
}

pub fn run_watch(args: &WatchArgs, ctx: &Context, project_root: &Path) -> anyhow::Result<()> {
    let project = Project::discover(project_root)?;
    let interval = args
        .interval
        .map_or_else(|| project.config.watch.interval(), |s| Duration::from_secs(s.max(1)));
    info!(interval_secs = interval.as_secs(), "watching SLA deadlines");

    let mut done = 0u64;
    loop {
        match tick_once(&project, ctx) {
            Ok(count) if count > 0 => info!(breaches = count, "sla tick"),
            Ok(_) => {}
            Err(err) => warn!(error = %format!("{err:#}"), "sla tick failed, retrying next interval"),
        }

        done += 1;
        if args.iterations.is_some_and(|limit| done >= limit) {
            return Ok(());
        }
        thread::sleep(interval);
    }
}
