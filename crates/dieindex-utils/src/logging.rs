//! # Logging Utilities
//!
//! Logging infrastructure for dieindex using `tracing`.
//!
//! This module provides structured logging with support for:
//! - Pretty (development) and JSON (machine-readable) output
//! - Environment variable configuration
//! - Optional file output next to the console
//!
//! Console output always goes to **stderr**, so query results printed on
//! stdout can be piped without log lines mixed in.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dieindex_utils::init_logging;
//!
//! // Initialize with default settings (reads RUST_LOG and DIEINDEX_LOG_*)
//! init_logging().expect("Failed to initialize logging");
//!
//! tracing::info!("Index built");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Log level filter (e.g. `RUST_LOG=debug`, `RUST_LOG=dieindex_core=trace`)
//! - `DIEINDEX_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
//! - `DIEINDEX_LOG_FILE`: Optional log file, rotated daily
//! - `DIEINDEX_LOG_DIR`: Optional directory for a dated `YYYY-MM-DD-dieindex.log` file

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, io};

use chrono::Utc;
use tracing::Level;
use tracing_appender::rolling::{self, RollingFileAppender};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default)
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl FromStr for LogFormat
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(LoggingError::InvalidFormat(format!("{s}. Use 'pretty' or 'json'"))),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level (default)
    Warn,
    /// Info level
    Info,
    /// Debug level
    Debug,
    /// Trace level (most verbose)
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LoggingError::InvalidLevel(format!(
                "{s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            ))),
        }
    }
}

/// Where log output should go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFile
{
    /// Daily-rotated file with this base path
    Rolling(PathBuf),
    /// `YYYY-MM-DD-dieindex.log` inside this directory
    Dated(PathBuf),
}

/// Resolved logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogSettings
{
    /// Explicit level; takes precedence over `RUST_LOG` when set
    pub level: Option<LogLevel>,
    pub format: LogFormat,
    pub file: Option<LogFile>,
}

impl LogSettings
{
    /// Settings from `DIEINDEX_LOG_*` environment variables.
    ///
    /// ## Errors
    ///
    /// Returns an error if `DIEINDEX_LOG_FORMAT` is set to an unknown format.
    pub fn from_env() -> Result<Self, LoggingError>
    {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    ///
    /// ## Errors
    ///
    /// Returns an error on an unknown format.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LoggingError>
    {
        let format = match lookup("DIEINDEX_LOG_FORMAT") {
            Some(format) => format.parse()?,
            None => LogFormat::default(),
        };

        // An explicit file wins over a directory
        let file = lookup("DIEINDEX_LOG_FILE")
            .map(|path| LogFile::Rolling(PathBuf::from(path)))
            .or_else(|| lookup("DIEINDEX_LOG_DIR").map(|dir| LogFile::Dated(PathBuf::from(dir))));

        Ok(Self {
            level: None,
            format,
            file,
        })
    }

    /// Override the level (typically from a `--log-level` flag).
    #[must_use]
    pub fn with_level(mut self, level: Option<LogLevel>) -> Self
    {
        if level.is_some() {
            self.level = level;
        }
        self
    }

    /// Filter applied to every output.
    ///
    /// Priority:
    /// 1. An explicit level
    /// 2. `RUST_LOG` (supports module-specific filters like `dieindex_core=debug`)
    /// 3. `WARN`
    fn env_filter(&self) -> EnvFilter
    {
        if let Some(level) = self.level {
            return EnvFilter::new(Level::from(level).to_string());
        }
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(Level::WARN.to_string()))
    }
}

/// Initialize logging from the environment
///
/// ## Example
///
/// ```rust,no_run
/// use dieindex_utils::init_logging;
///
/// init_logging().expect("Failed to initialize logging");
/// tracing::info!("Application started");
/// ```
///
/// ## Errors
///
/// Returns an error if:
/// - Logging is already initialized
/// - `DIEINDEX_LOG_FORMAT` is invalid
/// - The log file cannot be created
pub fn init_logging() -> Result<(), LoggingError>
{
    init_logging_with(&LogSettings::from_env()?)
}

/// Initialize logging with explicit settings
///
/// ## Example
///
/// ```rust,no_run
/// use dieindex_utils::{LogFormat, LogLevel, LogSettings, init_logging_with};
///
/// let settings = LogSettings {
///     level: Some(LogLevel::Debug),
///     format: LogFormat::Json,
///     file: None,
/// };
/// init_logging_with(&settings).expect("Failed to initialize logging");
/// ```
///
/// ## Errors
///
/// Returns an error if logging is already initialized or file logging fails.
pub fn init_logging_with(settings: &LogSettings) -> Result<(), LoggingError>
{
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    layers.push(match settings.format {
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(true)
            .with_writer(io::stderr)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_names(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(io::stderr)
            .boxed(),
    });

    if let Some(file) = &settings.file {
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender(file)?);

        // Keep the writer thread alive for the rest of the process
        std::mem::forget(guard);

        layers.push(match settings.format {
            LogFormat::Pretty => fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(false) // No ANSI in files
                .boxed(),
            LogFormat::Json => fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_current_span(true)
                .with_span_list(true)
                .boxed(),
        });
    }

    Registry::default()
        .with(layers)
        .with(settings.env_filter())
        .try_init()
        .map_err(|err| LoggingError::InitializationFailed(err.to_string()))
}

fn file_appender(file: &LogFile) -> Result<RollingFileAppender, LoggingError>
{
    match file {
        LogFile::Rolling(path) => {
            let directory = path.parent().filter(|dir| !dir.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| LoggingError::InvalidFile(path.clone()))?;
            Ok(rolling::daily(directory, name))
        }
        LogFile::Dated(directory) => {
            std::fs::create_dir_all(directory)?;
            Ok(rolling::never(directory, dated_file_name(&Utc::now().format("%Y-%m-%d").to_string())))
        }
    }
}

fn dated_file_name(date: &str) -> String
{
    format!("{date}-dieindex.log")
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    /// Invalid log level
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// Log file path without a file name
    #[error("Invalid log file path: {}", .0.display())]
    InvalidFile(PathBuf),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}

#[cfg(test)]
mod tests
{
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String>
    {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_log_format_from_str()
    {
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("dev").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("prod").unwrap(), LogFormat::Json);
        assert!(matches!(LogFormat::from_str("invalid"), Err(LoggingError::InvalidFormat(_))));
    }

    #[test]
    fn test_log_level_from_str()
    {
        assert_eq!(LogLevel::from_str("error").unwrap(), LogLevel::Error);
        assert_eq!(LogLevel::from_str("warn").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("debug").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert!(matches!(LogLevel::from_str("invalid"), Err(LoggingError::InvalidLevel(_))));
    }

    #[test]
    fn test_log_level_to_tracing_level()
    {
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
        assert_eq!(Level::from(LogLevel::Debug), Level::DEBUG);
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
    }

    #[test]
    fn test_settings_from_lookup()
    {
        let settings = LogSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, LogSettings::default());

        let settings = LogSettings::from_lookup(lookup(&[
            ("DIEINDEX_LOG_FORMAT", "json"),
            ("DIEINDEX_LOG_FILE", "/tmp/dieindex.log"),
            ("DIEINDEX_LOG_DIR", "/tmp/logs"),
        ]))
        .unwrap();
        assert_eq!(settings.format, LogFormat::Json);
        assert_eq!(settings.file, Some(LogFile::Rolling(PathBuf::from("/tmp/dieindex.log"))));

        let settings = LogSettings::from_lookup(lookup(&[("DIEINDEX_LOG_DIR", "/tmp/logs")])).unwrap();
        assert_eq!(settings.file, Some(LogFile::Dated(PathBuf::from("/tmp/logs"))));

        assert!(LogSettings::from_lookup(lookup(&[("DIEINDEX_LOG_FORMAT", "xml")])).is_err());
    }

    #[test]
    fn test_with_level_keeps_existing_when_none()
    {
        let settings = LogSettings::default().with_level(Some(LogLevel::Debug)).with_level(None);
        assert_eq!(settings.level, Some(LogLevel::Debug));
    }

    #[test]
    fn test_dated_file_name()
    {
        assert_eq!(dated_file_name("2026-01-31"), "2026-01-31-dieindex.log");
    }

    #[test]
    fn test_rolling_file_needs_file_name()
    {
        assert!(matches!(
            file_appender(&LogFile::Rolling(PathBuf::from("/"))),
            Err(LoggingError::InvalidFile(_))
        ));
    }
}
