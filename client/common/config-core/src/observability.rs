//! Observability configuration and tracing setup

use error_types::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use validator::Validate;

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ObservabilityConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Log format
    #[serde(default)]
    pub format: LogFormat,

    /// Per-module overrides, e.g. `forum_api = "debug"`
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            filters: HashMap::new(),
        }
    }
}

impl ObservabilityConfig {
    /// Get log filter string for tracing-subscriber
    pub fn get_filter_string(&self) -> String {
        let mut filters = vec![self.level.to_string()];

        let mut modules: Vec<_> = self.filters.iter().collect();
        modules.sort_by(|a, b| a.0.cmp(b.0));
        for (module, level) in modules {
            filters.push(format!("{}={}", module, level));
        }

        filters.join(",")
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Log format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line human readable output
    #[default]
    Compact,
    /// Multi-line output for local debugging
    Pretty,
    /// JSON lines for log shipping
    Json,
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured levels. Logs go to stderr
/// so command output on stdout stays clean. Returns `false` when a subscriber
/// was already installed, which is not an error.
pub fn init_tracing(config: &ObservabilityConfig) -> ClientResult<bool> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.get_filter_string())
            .map_err(|e| ClientError::Config(format!("Invalid log filter: {}", e)))?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = match config.format {
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(true).with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .try_init(),
    };

    Ok(installed.is_ok())
}
