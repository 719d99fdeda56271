#![forbid(unsafe_code)]

mod actor;
mod cmd;
mod output;

use clap::{Parser, Subcommand};
use helpdesk_core::config;
use output::{CliError, OutputMode, render_error};
use std::env;
use std::io;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "hd: ticket tracking with optimistic concurrency and SLA breach detection",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Override actor identity (skips env resolution).
    #[arg(long, global = true)]
    actor: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Project",
        about = "Initialize a helpdesk project",
        after_help = "EXAMPLES:\n    hd init\n    hd init --force --json"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        next_help_heading = "Tickets",
        about = "Create a ticket",
        after_help = "EXAMPLES:\n    hd create --title \"Cannot login\" --priority high --sla-hours 4\n    hd create -t \"VPN down\" --requester alice --json"
    )]
    Create(cmd::create::CreateArgs),

    #[command(
        next_help_heading = "Read",
        about = "List tickets, newest first",
        after_help = "EXAMPLES:\n    hd list\n    hd list --status pending --query payment --page 2"
    )]
    List(cmd::list::ListArgs),

    #[command(next_help_heading = "Read", about = "Show one ticket with its history")]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Tickets",
        about = "Edit ticket fields",
        long_about = "Edit ticket fields. With --expect-version the edit is rejected if \
                      anyone changed the ticket since you read it.",
        after_help = "EXAMPLES:\n    hd update hd-4f2a --priority urgent --expect-version 3\n    hd update 4f2a --sla-hours 8"
    )]
    Update(cmd::update::UpdateArgs),

    #[command(next_help_heading = "Tickets", about = "Change a ticket's status")]
    Status(cmd::status::StatusArgs),

    #[command(next_help_heading = "Tickets", about = "Set or clear the assignee")]
    Assign(cmd::assign::AssignArgs),

    #[command(
        next_help_heading = "Tickets",
        about = "Bump the version without changing fields"
    )]
    Touch(cmd::update::TouchArgs),

    #[command(next_help_heading = "Tickets", about = "Add a comment")]
    Comment(cmd::comment::CommentArgs),

    #[command(
        next_help_heading = "Tickets",
        about = "Record a change made by an external system",
        long_about = "Record a change made by an external system. No version check; \
                      anyone holding the old version will conflict afterwards."
    )]
    External(cmd::update::ExternalArgs),

    #[command(
        next_help_heading = "SLA",
        about = "Evaluate SLA deadlines once",
        after_help = "EXAMPLES:\n    hd tick\n    hd tick --now 2026-03-01T10:01:00Z --json"
    )]
    Tick(cmd::tick::TickArgs),

    #[command(
        next_help_heading = "SLA",
        about = "Evaluate SLA deadlines periodically",
        after_help = "EXAMPLES:\n    hd watch\n    hd watch --interval 60\n    hd watch --iterations 1"
    )]
    Watch(cmd::watch::WatchArgs),

    #[command(next_help_heading = "Read", about = "Show the event log")]
    Log(cmd::log::LogArgs),

    #[command(next_help_heading = "Read", about = "Show dashboard counts")]
    Stats(cmd::stats::StatsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("HELPDESK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "helpdesk=debug,info"
        } else {
            "helpdesk=info,warn"
        })
    });

    let format = env::var("HELPDESK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // stdout belongs to command output.
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let user = config::load_user_config().unwrap_or_else(|err| {
        warn!(error = %format!("{err:#}"), "ignoring unreadable user config");
        config::UserConfig::default()
    });
    let output = OutputMode::resolve(cli.json, user.output.as_deref());
    let ctx = cmd::Context::new(output, cli.actor.clone(), user);
    let project_root = env::current_dir()?;

    let result = match &cli.command {
        Commands::Init(args) => cmd::init::run_init(args, &ctx, &project_root),
        Commands::Create(args) => cmd::create::run_create(args, &ctx, &project_root),
        Commands::List(args) => cmd::list::run_list(args, &ctx, &project_root),
        Commands::Show(args) => cmd::show::run_show(args, &ctx, &project_root),
        Commands::Update(args) => cmd::update::run_update(args, &ctx, &project_root),
        Commands::Status(args) => cmd::status::run_status(args, &ctx, &project_root),
        Commands::Assign(args) => cmd::assign::run_assign(args, &ctx, &project_root),
        Commands::Touch(args) => cmd::update::run_touch(args, &ctx, &project_root),
        Commands::Comment(args) => cmd::comment::run_comment(args, &ctx, &project_root),
        Commands::External(args) => cmd::update::run_external(args, &ctx, &project_root),
        Commands::Tick(args) => cmd::tick::run_tick(args, &ctx, &project_root),
        Commands::Watch(args) => cmd::watch::run_watch(args, &ctx, &project_root),
        Commands::Log(args) => cmd::log::run_log(args, &ctx, &project_root),
        Commands::Stats(args) => cmd::stats::run_stats(args, &ctx, &project_root),
    };

    if let Err(err) = result {
        render_error(output, &CliError::from_anyhow(&err))?;
        std::process::exit(1);
    }
    Ok(())
}
