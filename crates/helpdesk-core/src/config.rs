use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::mutate::validate_sla_hours;

/// Name of the per-project directory holding config and store.
pub const PROJECT_DIR: &str = ".helpdesk";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub sla: SlaConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaConfig {
    /// SLA budget for tickets created without an explicit one.
    #[serde(default = "default_sla_hours")]
    pub default_hours: f64,
}

impl Default for SlaConfig {
    fn default() -> Self {
        Self {
            default_hours: default_sla_hours(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Seconds between SLA ticks in `hd watch`.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

impl WatchConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl StoreConfig {
    #[must_use]
    pub const fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    /// Fallback actor identity when neither flag nor env var is set.
    #[serde(default)]
    pub actor: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
}

/// The subset of configuration the desk itself consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeskConfig {
    pub default_sla_hours: f64,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            default_sla_hours: default_sla_hours(),
        }
    }
}

impl ProjectConfig {
    #[must_use]
    pub const fn desk(&self) -> DeskConfig {
        DeskConfig {
            default_sla_hours: self.sla.default_hours,
        }
    }
}

/// Load `.helpdesk/config.toml` under `project_root`, or defaults if absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed, or if
/// `sla.default_hours` is not a valid SLA budget.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(PROJECT_DIR).join("config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config = toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    validate_sla_hours(config.sla.default_hours)
        .with_context(|| format!("Invalid sla.default_hours in {}", path.display()))?;

    Ok(config)
}

/// Load `~/.config/helpdesk/config.toml`, or defaults if absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("helpdesk/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Default `config.toml` written by `hd init`.
#[must_use]
pub fn default_config_toml() -> String {
    let config = ProjectConfig::default();
    toml::to_string_pretty(&config).unwrap_or_default()
}

const fn default_sla_hours() -> f64 {
    24.0
}

const fn default_interval_secs() -> u64 {
    5
}

const fn default_lock_timeout_ms() -> u64 {
    5_000
}
