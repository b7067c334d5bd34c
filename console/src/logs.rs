//! Logging configuration

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing_subscriber::{fmt as tracing_fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::errors::ConsoleError;

/// Log level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_filter())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("Invalid log level: {}", other)),
        }
    }
}

// Stored as the filter string so settings files stay human-editable
impl Serialize for LogLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_filter())
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

/// Logging options
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub log_level: LogLevel,

    /// Emit JSON lines instead of human-readable output
    pub json_format: bool,
}

/// Initialize logging.
///
/// Logs go to stderr; stdout is reserved for the rendered console view.
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(options: LogOptions) -> Result<(), ConsoleError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.log_level.as_filter()));

    let subscriber = tracing_subscriber::registry().with(filter);
    let result = if options.json_format {
        subscriber
            .with(tracing_fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        subscriber
            .with(tracing_fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| ConsoleError::ConfigError(e.to_string()))
}
