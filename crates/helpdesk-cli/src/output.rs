//! Shared output layer so every command renders text and JSON the same way.
//!
//! Command handlers receive an [`OutputMode`] and call [`render`] with a
//! serializable value plus a closure for the human form. Errors never go to
//! stdout: [`render_error`] writes them to stderr in the same mode.

use helpdesk_core::{DeskError, ErrorCode};
use serde::Serialize;
use std::io::{self, Write};

/// Shared width for human separators.
pub const RULE_WIDTH: usize = 72;

pub fn rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    rule(w)
}

/// Render a left-aligned key/value line in human output.
pub fn kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<12} {}", format!("{key}:"), value.as_ref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    /// `--json` wins; otherwise the user config's `output = "json"` applies.
    pub fn resolve(json_flag: bool, configured: Option<&str>) -> Self {
        if json_flag || configured.is_some_and(|v| v.eq_ignore_ascii_case("json")) {
            Self::Json
        } else {
            Self::Human
        }
    }
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. "conflict", "not_a_project").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    pub fn with_details(
        message: impl Into<String>,
        suggestion: impl Into<String>,
        error_code: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            suggestion: Some(suggestion.into()),
            error_code: Some(error_code.into()),
        }
    }

    /// Best structured form of any command failure.
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        if let Some(cli) = err.downcast_ref::<Self>() {
            return cli.clone();
        }
        if let Some(desk) = err.downcast_ref::<DeskError>() {
            return Self::from(desk);
        }
        Self::new(format!("{err:#}"))
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

/// Stable snake_case name for an error code, used in JSON errors.
pub const fn error_slug(code: ErrorCode) -> &'static str {
    match code {
        ErrorCode::NotInitialized => "not_a_project",
        ErrorCode::ConfigParseError => "config_parse",
        ErrorCode::TicketNotFound => "not_found",
        ErrorCode::VersionConflict => "conflict",
        ErrorCode::InvalidInput => "invalid_input",
        ErrorCode::InvalidEnumValue => "invalid_value",
        ErrorCode::IdSpaceExhausted => "id_space_exhausted",
        ErrorCode::PersistenceFailed => "persistence_failed",
        ErrorCode::LockContention => "lock_contention",
        ErrorCode::CorruptStore => "corrupt_store",
    }
}

impl From<&DeskError> for CliError {
    fn from(err: &DeskError) -> Self {
        let suggestion = match err {
            DeskError::Conflict {
                id,
                current_version,
                ..
            } => Some(format!(
                "Run 'hd show {id}' and retry with --expect-version {current_version}"
            )),
            DeskError::NotFound { .. } => Some("Run 'hd list' to see ticket ids".to_string()),
            _ => err.hint().map(str::to_string),
        };
        Self {
            message: err.to_string(),
            suggestion,
            error_code: Some(error_slug(err.code()).to_string()),
        }
    }
}

/// Render a serializable value to stdout in the requested format.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Human => human_fn(value, &mut out)?,
    }
    Ok(())
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({ "error": error });
            serde_json::to_writer_pretty(&mut out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Human => {
            writeln!(out, "error: {}", error.message)?;
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}
