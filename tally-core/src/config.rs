//! Runtime configuration.
//!
//! Loaded once at startup from `~/.tally/config.yaml` (or an explicit path)
//! and injected into the run driver and adapters at construction time — no
//! ambient globals.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default expected working hours per day.
pub const DEFAULT_EXPECTED_HOURS: f64 = 8.0;

/// Credentials and endpoint for the time-tracking source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TmsConfig {
    /// Base URL, e.g. `https://tms.example.com`.
    pub server: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

/// Credentials for the outbound mail service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailgunConfig {
    /// Full messages-endpoint base, e.g.
    /// `https://api.mailgun.net/v3/mg.example.com`.
    pub domain: String,
    pub api_key: String,
    pub from_email: String,
}

/// Top-level configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_expected_hours")]
    pub expected_daily_hours: f64,
    pub tms: TmsConfig,
    pub mailgun: MailgunConfig,
    /// Fixed recipient for top-level failure alerts.
    pub operator_email: String,
}

fn default_expected_hours() -> f64 {
    DEFAULT_EXPECTED_HOURS
}

/// `<home>/.tally/config.yaml` — pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".tally").join("config.yaml")
}

/// Load configuration from an explicit path.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path context) if malformed YAML.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load configuration from `<home>/.tally/config.yaml`.
pub fn load_at(home: &Path) -> Result<Config, ConfigError> {
    load(&config_path_at(home))
}
