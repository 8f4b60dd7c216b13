//! Logging configuration

use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::errors::ReporterError;
use crate::settings::ReporterSettings;

/// Default verbosity, used when `RUST_LOG` is unset or unusable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    #[serde(alias = "warning")]
    Warn,
    Error,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    /// Case-insensitive; `warning` is accepted for `warn`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        let name = if name == "warning" { "warn" } else { name.as_str() };
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == name)
            .ok_or_else(|| format!("unknown log level '{}'", s))
    }
}

/// Logging options
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Default level when `RUST_LOG` is unset
    pub log_level: LogLevel,

    /// Emit one JSON object per event
    pub json_format: bool,

    /// Include the event target (module path)
    pub with_target: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            json_format: false,
            with_target: true,
        }
    }
}

impl From<&ReporterSettings> for LogOptions {
    fn from(settings: &ReporterSettings) -> Self {
        Self {
            log_level: settings.log_level,
            ..Self::default()
        }
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(options: LogOptions) -> Result<(), ReporterError> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(options.log_level).into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::registry().with(filter);

    let installed = if options.json_format {
        subscriber
            .with(fmt::layer().json().with_target(options.with_target))
            .try_init()
    } else {
        subscriber
            .with(fmt::layer().with_target(options.with_target))
            .try_init()
    };
    installed.map_err(|e| ReporterError::ConfigError(e.to_string()))
}
