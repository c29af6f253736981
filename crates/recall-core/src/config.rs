use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Local owner id used by the console front-end when none is configured.
pub const DEFAULT_CONSOLE_OWNER: i64 = 1;

/// Top-level config (recall.toml + RECALL_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RecallConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Which escalating interval sequence the scheduler runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum IntervalPreset {
    /// 1 hour, 1 day, 3 days, 1 week, 2 weeks, 4 weeks.
    #[default]
    Production,
    /// Second-scale delays for manual testing.
    Staging,
    /// Six delays taken from `scheduler.custom` (seconds).
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SchedulerConfig {
    #[serde(default)]
    pub intervals: IntervalPreset,
    /// Delays in seconds for `intervals = "custom"`; must hold six strictly
    /// increasing values.
    #[serde(default)]
    pub custom: Vec<u64>,
}

/// How the console sink prints notifications.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Owner id every console line is attributed to.
    #[serde(default = "default_console_owner")]
    pub owner: i64,
    #[serde(default)]
    pub output: OutputFormat,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            owner: DEFAULT_CONSOLE_OWNER,
            output: OutputFormat::default(),
        }
    }
}

fn default_console_owner() -> i64 {
    DEFAULT_CONSOLE_OWNER
}

fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.recall/recall.db", home)
}

impl RecallConfig {
    /// Load config from a TOML file with RECALL_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.recall/recall.toml
    ///
    /// A missing file is not an error; every field has a default.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);
        tracing::debug!(path = %path, "loading config");

        let config: RecallConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("RECALL_").split("_"))
            .extract()
            .map_err(|e| crate::error::ConfigError::Invalid(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.recall/recall.toml", home)
}
