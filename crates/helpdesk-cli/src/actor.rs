//! Actor identity resolution for CLI commands.
//!
//! The resolution chain: `--actor` flag > `HELPDESK_ACTOR` env > `actor` in
//! the user config > `USER` env (TTY only). Commands that attribute their
//! change to someone (create, comment) require an actor; the rest record one
//! when it is available.

use std::env;

use crate::output::CliError;

/// Environment reader trait for dependency injection in tests.
trait EnvReader {
    fn get(&self, key: &str) -> Option<String>;
    fn is_tty(&self) -> bool;
}

struct RealEnv;

impl EnvReader for RealEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.is_empty())
    }

    fn is_tty(&self) -> bool {
        use std::io::IsTerminal;
        std::io::stdin().is_terminal()
    }
}

fn resolve_actor_with(
    cli_flag: Option<&str>,
    configured: Option<&str>,
    env: &dyn EnvReader,
) -> Option<String> {
    if let Some(actor) = cli_flag.filter(|a| !a.is_empty()) {
        return Some(actor.to_string());
    }

    if let Some(val) = env.get("HELPDESK_ACTOR") {
        return Some(val);
    }

    if let Some(actor) = configured.filter(|a| !a.is_empty()) {
        return Some(actor.to_string());
    }

    // USER only counts when a person is at the keyboard.
    if env.is_tty() {
        return env.get("USER");
    }

    None
}

/// Resolve the actor identity, or `None` if nothing in the chain is set.
pub fn resolve_actor(cli_flag: Option<&str>, configured: Option<&str>) -> Option<String> {
    resolve_actor_with(cli_flag, configured, &RealEnv)
}

/// Resolve the actor identity, returning an error if not found.
pub fn require_actor(cli_flag: Option<&str>, configured: Option<&str>) -> Result<String, CliError> {
    resolve_actor(cli_flag, configured).ok_or_else(|| {
        CliError::with_details(
            "Actor identity required for this command",
            "Set --actor or HELPDESK_ACTOR, or add `actor = \"...\"` to ~/.config/helpdesk/config.toml",
            "missing_actor",
        )
    })
}
