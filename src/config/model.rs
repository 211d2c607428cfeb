use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::ResourceKind;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub docker: DockerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub logging: LogConfig,
}

/// Polling and stream settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Container list and per-container stats refresh
    #[serde(default = "default_stats_interval")]
    pub stats_interval_ms: u64,
    /// Host CPU/memory/disk refresh
    #[serde(default = "default_system_stats_interval")]
    pub system_stats_interval_ms: u64,
    /// Backlog lines loaded when a log view opens
    #[serde(default = "default_log_tail")]
    pub log_tail: usize,
    #[serde(default = "default_notification_ttl")]
    pub notification_ttl_seconds: i64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            stats_interval_ms: default_stats_interval(),
            system_stats_interval_ms: default_system_stats_interval(),
            log_tail: default_log_tail(),
            notification_ttl_seconds: default_notification_ttl(),
        }
    }
}

/// Docker connection settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DockerConfig {
    /// e.g. `unix:///var/run/docker.sock` or `tcp://host:2375`
    #[serde(default)]
    pub host: Option<String>,
}

/// UI customization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub mouse_enabled: bool,
    /// Column ids hidden at startup, keyed by table (`containers`, `images`,
    /// `volumes`, `networks`)
    #[serde(default)]
    pub hidden_columns: HashMap<String, Vec<String>>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            mouse_enabled: true,
            hidden_columns: HashMap::new(),
        }
    }
}

impl UiConfig {
    pub fn hidden_for(&self, kind: ResourceKind) -> &[String] {
        self.hidden_columns
            .get(kind.table_key())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Defaults to `dockdeck.log` in the system temp directory
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl LogConfig {
    pub fn file_path(&self) -> PathBuf {
        self.file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("dockdeck.log"))
    }
}

// Default value functions
fn default_stats_interval() -> u64 {
    3000
}

fn default_system_stats_interval() -> u64 {
    5000
}

fn default_log_tail() -> usize {
    200
}

fn default_notification_ttl() -> i64 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
