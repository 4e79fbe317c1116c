//! Configuration models with serde defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level hostwatch configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Convergence polling parameters.
    #[serde(default)]
    pub polling: PollingConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Convergence polling parameters.
///
/// The fixed per-tick delay combined with the hard tick budget is the
/// sole timeout mechanism: budget x delay is the effective maximum
/// polling duration (defaults: 15 x 500ms = 7.5s for a start watch).
/// Budgets are asymmetric because starting a server is expected to
/// take longer than stopping one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Fixed inter-tick delay in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Tick budget for a start-convergence watch.
    #[serde(default = "default_start_budget")]
    pub start_budget: u32,

    /// Tick budget for a stop-convergence watch.
    #[serde(default = "default_stop_budget")]
    pub stop_budget: u32,
}

impl PollingConfig {
    /// Inter-tick delay as a [`Duration`].
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Tick budget for the requested transition direction.
    pub fn budget_for(&self, desired_running: bool) -> u32 {
        if desired_running {
            self.start_budget
        } else {
            self.stop_budget
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            start_budget: default_start_budget(),
            stop_budget: default_stop_budget(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (json, pretty).
    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// Directory for log files (if `None`, logs only to stdout).
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Structured JSON lines.
    Json,
    /// Human-readable multi-line output.
    Pretty,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}

fn default_delay_ms() -> u64 {
    500
}

fn default_start_budget() -> u32 {
    15
}

fn default_stop_budget() -> u32 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Json
}
