//! Logging infrastructure for Trailgate.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Environment variables read by [`LogConfig::from_env`].
pub mod vars {
    pub const LOG_LEVEL: &str = "TRAILGATE_LOG_LEVEL";
    pub const LOG_FORMAT: &str = "TRAILGATE_LOG_FORMAT";
    pub const LOG_FILE: &str = "TRAILGATE_LOG_FILE";
    pub const LOG_SPANS: &str = "TRAILGATE_LOG_SPANS";
}

/// Logging configuration.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Minimum log level.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
    /// Log file path (if file logging enabled).
    pub file_path: Option<PathBuf>,
    /// Include source file and line.
    pub source_location: bool,
    /// Include span open/close events.
    pub span_events: bool,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
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

impl LogLevel {
    /// Parse from string, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Parse from string; anything unrecognized is `Info`.
    pub fn parse_lossy(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }

    /// Filter directive for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Whether source locations are reported at this level.
    pub fn reports_caller(&self) -> bool {
        matches!(self, Self::Trace | Self::Debug)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format.
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
    /// JSON structured format.
    Json,
}

impl LogFormat {
    /// Parse from string; anything unrecognized is `Pretty`.
    pub fn parse_lossy(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(level) = lookup(vars::LOG_LEVEL) {
            config = config.with_level(LogLevel::parse_lossy(&level));
        }

        if let Some(format) = lookup(vars::LOG_FORMAT) {
            config.format = LogFormat::parse_lossy(&format);
        }

        if let Some(file_path) = lookup(vars::LOG_FILE) {
            config.file_path = Some(PathBuf::from(file_path));
        }

        if let Some(span_events) = lookup(vars::LOG_SPANS) {
            config.span_events = span_events.eq_ignore_ascii_case("true") || span_events == "1";
        }

        config
    }

    /// Set the level; debug and trace also turn on source locations.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self.source_location = level.reports_caller();
        self
    }
}

fn span_events(config: &LogConfig) -> FmtSpan {
    if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    }
}

fn open_log_file(config: &LogConfig) -> Result<Option<Arc<std::fs::File>>, LogError> {
    match &config.file_path {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            Ok(Some(Arc::new(file)))
        }
        None => Ok(None),
    }
}

/// Initialize logging with the given configuration.
///
/// Diagnostics go to stderr, and additionally to the configured file.
pub fn init(config: LogConfig) -> Result<(), LogError> {
    let filter = EnvFilter::new(config.level.as_str());
    let file = open_log_file(&config)?;
    let registry = tracing_subscriber::registry().with(filter);
    let location = config.source_location;

    let result = match config.format {
        LogFormat::Pretty => {
            let stderr_layer = fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(true)
                .with_target(true)
                .with_file(location)
                .with_line_number(location)
                .with_span_events(span_events(&config));
            let file_layer = file.map(|file| {
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_file(location)
                    .with_line_number(location)
                    .with_span_events(span_events(&config))
            });
            registry.with(stderr_layer).with(file_layer).try_init()
        }
        LogFormat::Compact => {
            let stderr_layer = fmt::layer()
                .compact()
                .with_writer(io::stderr)
                .with_ansi(true)
                .with_file(location)
                .with_line_number(location)
                .with_span_events(span_events(&config));
            let file_layer = file.map(|file| {
                fmt::layer()
                    .compact()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_file(location)
                    .with_line_number(location)
                    .with_span_events(span_events(&config))
            });
            registry.with(stderr_layer).with(file_layer).try_init()
        }
        LogFormat::Json => {
            let stderr_layer = fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_file(location)
                .with_line_number(location)
                .with_span_events(span_events(&config));
            let file_layer = file.map(|file| {
                fmt::layer()
                    .json()
                    .with_writer(file)
                    .with_file(location)
                    .with_line_number(location)
                    .with_span_events(span_events(&config))
            });
            registry.with(stderr_layer).with(file_layer).try_init()
        }
    };

    result.map_err(|e| LogError::InitError(e.to_string()))
}

/// Logging errors.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("failed to initialize logging: {0}")]
    InitError(String),

    #[error("failed to open log file: {0}")]
    FileError(#[from] io::Error),
}

/// Convenience macros re-exported from tracing.
pub use tracing::{debug, error, info, trace, warn};

/// Flush spans and timing.
pub mod spans;
