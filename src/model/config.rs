use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API token. `TODOIST_TOKEN` takes precedence when set.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            token: None,
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Wrap rows in ANSI colors by priority
    #[serde(default = "default_true")]
    pub color: bool,
    /// Appended to a task's content when it has notes
    #[serde(default = "default_note_marker")]
    pub note_marker: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            color: true,
            note_marker: default_note_marker(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// flexi_logger spec, e.g. "warn" or "info, tdl::io=debug". `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log to rotating files here instead of stderr
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
            dir: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_endpoint() -> String {
    "https://todoist.com/api/v7/sync".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_note_marker() -> String {
    " \u{1F4AC}".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}
