//! Settings for the remote services and logging.
//!
//! Read from an optional `settings.toml` in the working directory, then from
//! `RECONCILE__*` environment variables (`RECONCILE__MATCHER__BASE_URL`, ...).
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

use crate::utils::DEFAULT_LOG_FILTER;

fn default_timeout_secs() -> u64 {
    60
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatcherSettings {
    pub base_url: String,
    pub sheet_link: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub matcher: MatcherSettings,
    #[serde(default)]
    pub log: LogSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("RECONCILE").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?;

        settings.try_deserialize()
    }
}
