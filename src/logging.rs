//! Structured logging setup.
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and one of
//! three console formats on stderr, plus optional daily-rotated log files:
//! one with every event that passes the filter and one with errors only.
//! Order and trade events use dedicated targets so they can be filtered
//! independently, e.g. `RUST_LOG=orderdesk=warn,orderdesk::trade=info`.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;
use tracing::Level;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// Target for order placement events.
pub const ORDER_TARGET: &str = "orderdesk::order";
/// Target for executed trades.
pub const TRADE_TARGET: &str = "orderdesk::trade";

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
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

impl FromStr for LogLevel {
    type Err = String;

    /// Accepts the usual names in any case; `WARNING` and `CRITICAL` map to
    /// `Warn` and `Error`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" | "critical" => Ok(Self::Error),
            _ => Err(format!("Unknown log level: '{}'", s)),
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Compact,
    /// JSON lines for log shippers
    Json,
}

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Cannot open log file in {directory}: {source}")]
    File {
        directory: String,
        #[source]
        source: InitError,
    },

    #[error("A global tracing subscriber is already installed")]
    AlreadyInitialized,
}

/// Daily-rotated log files.
///
/// `bot.log` in `logs/` produces `logs/bot.YYYY-MM-DD.log` with every event
/// and `logs/error.YYYY-MM-DD.log` with `ERROR` events only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLogConfig {
    pub directory: PathBuf,
    pub file_name: String,
    /// Rotated files kept per log
    pub max_files: usize,
}

impl FileLogConfig {
    pub fn new(directory: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            file_name: file_name.into(),
            max_files: 5,
        }
    }

    fn appender(&self, prefix: &str) -> Result<RollingFileAppender, LoggingError> {
        let mut builder = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(prefix)
            .max_log_files(self.max_files);
        if let Some(ext) = Path::new(&self.file_name).extension().and_then(|e| e.to_str()) {
            builder = builder.filename_suffix(ext);
        }

        builder
            .build(&self.directory)
            .map_err(|source| LoggingError::File {
                directory: self.directory.display().to_string(),
                source,
            })
    }

    fn main_prefix(&self) -> &str {
        Path::new(&self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("orderdesk")
    }
}

/// Log configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub show_target: bool,
    pub show_thread_ids: bool,
    /// `None` logs to the console only
    pub file: Option<FileLogConfig>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Pretty,
            show_target: true,
            show_thread_ids: false,
            file: None,
        }
    }
}

impl LogConfig {
    pub fn with_level(level: LogLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    pub fn production() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Json,
            show_target: true,
            show_thread_ids: true,
            file: None,
        }
    }

    #[must_use]
    pub fn with_file(mut self, file: FileLogConfig) -> Self {
        self.file = Some(file);
        self
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("orderdesk={}", self.level)))
    }

    fn console_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        // stderr keeps stdout free for command output
        let base = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(self.show_target)
            .with_thread_ids(self.show_thread_ids);

        match self.format {
            LogFormat::Pretty => base.pretty().with_filter(self.env_filter()).boxed(),
            LogFormat::Compact => base.compact().with_filter(self.env_filter()).boxed(),
            LogFormat::Json => base.json().with_filter(self.env_filter()).boxed(),
        }
    }

    fn layers(&self) -> Result<Vec<Box<dyn Layer<Registry> + Send + Sync>>, LoggingError> {
        let mut layers = vec![self.console_layer()];

        if let Some(file) = &self.file {
            layers.push(
                fmt::layer()
                    .with_writer(file.appender(file.main_prefix())?)
                    .with_ansi(false)
                    .with_target(true)
                    .with_filter(self.env_filter())
                    .boxed(),
            );
            layers.push(
                fmt::layer()
                    .with_writer(file.appender("error")?)
                    .with_ansi(false)
                    .with_target(true)
                    .with_filter(LevelFilter::ERROR)
                    .boxed(),
            );
        }

        Ok(layers)
    }
}

/// Initialize the global subscriber.
///
/// # Errors
/// `File` if a log file cannot be opened, `AlreadyInitialized` if a global
/// subscriber is already set.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    tracing_subscriber::registry()
        .with(config.layers()?)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)
}

/// Initialize the global subscriber, ignoring an existing one.
///
/// Suitable for tests where several cases may initialize logging.
pub fn try_init_logging(config: &LogConfig) {
    if let Ok(layers) = config.layers() {
        let _ = tracing_subscriber::registry().with(layers).try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_level_parsing() {
        assert_eq!("INFO".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("Warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("CRITICAL".parse::<LogLevel>().unwrap(), LogLevel::Error);
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_try_init_is_repeatable() {
        try_init_logging(&LogConfig::with_level(LogLevel::Debug));
        try_init_logging(&LogConfig::production());
        tracing::info!(target: ORDER_TARGET, "logging initialised");
    }

    fn read_log(dir: &Path, prefix: &str) -> String {
        let entry = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .find(|p| {
                let name = p.file_name().unwrap().to_str().unwrap();
                name.starts_with(prefix) && name.ends_with(".log")
            })
            .unwrap_or_else(|| panic!("no {prefix} log in {}", dir.display()));
        std::fs::read_to_string(entry).unwrap()
    }

    #[test]
    fn test_file_logs_split_errors_into_own_file() {
        let dir = tempdir().unwrap();
        let config = LogConfig::with_level(LogLevel::Info)
            .with_file(FileLogConfig::new(dir.path().join("logs"), "bot.log"));

        let subscriber = tracing_subscriber::registry().with(config.layers().unwrap());
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: ORDER_TARGET, symbol = "BTC-USDT", "Order placed");
            tracing::error!(target: TRADE_TARGET, "Fill could not be applied");
        });

        let main_log = read_log(&dir.path().join("logs"), "bot.");
        assert!(main_log.contains("Order placed"));
        assert!(main_log.contains(ORDER_TARGET));
        assert!(main_log.contains("Fill could not be applied"));

        let error_log = read_log(&dir.path().join("logs"), "error.");
        assert!(error_log.contains("Fill could not be applied"));
        assert!(error_log.contains(TRADE_TARGET));
        assert!(!error_log.contains("Order placed"));
    }

    #[test]
    fn test_unwritable_log_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let config = LogConfig::default().with_file(FileLogConfig::new(&blocker, "bot.log"));
        assert!(matches!(config.layers(), Err(LoggingError::File { .. })));
    }

    #[test]
    fn test_targets_sit_under_crate_filter() {
        for target in [ORDER_TARGET, TRADE_TARGET] {
            assert!(target.starts_with("orderdesk::"));
        }
        assert_ne!(ORDER_TARGET, TRADE_TARGET);
    }
}
