// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::writers::{FileWriter, StdWriter};
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{LazyLock, Mutex};
use tracing::subscriber::{DefaultGuard, SetGlobalDefaultError};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::reload::{self, Handle};
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Minimum level of the events that reach the configured outputs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
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
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(LoggerError::InvalidLevel(s.to_owned())),
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

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("logger is not initialized")]
    NotInitialized,
    #[error("logger lock is poisoned")]
    LockPoisoned,
    #[error("another global tracing subscriber is already installed")]
    GlobalSubscriber(#[from] SetGlobalDefaultError),
    #[error("failed to reload logger configuration: {0}")]
    Reload(#[from] reload::Error),
    #[error("failed to open log file {path:?}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid log level '{0}'")]
    InvalidLevel(String),
}

/// JSON lines written to a file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileConfig {
    pub path: PathBuf,
    /// The file is rotated once it reaches this size. 0 disables rotation.
    pub max_size_bytes: u64,
    /// Upper bound on the active file plus rotated files kept on disk; the
    /// oldest rotated files are deleted first. 0 keeps everything.
    pub max_files: u64,
}

impl FileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_size_bytes: 0,
            max_files: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StdTarget {
    Out,
    Err,
}

/// Human readable lines written to stdout or stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StdConfig {
    pub target: StdTarget,
}

type Filtered = Layered<reload::Layer<EnvFilter, Registry>, Registry>;
type OutputLayer = Box<dyn Layer<Filtered> + Send + Sync>;

/// A subscriber made of a reloadable level filter and a reloadable set of
/// output layers.
struct Logger {
    outputs: Handle<Vec<OutputLayer>, Filtered>,
    filter: Handle<EnvFilter, Registry>,
    /// Only set for thread-local loggers.
    _guard: Option<DefaultGuard>,
    file: Option<FileConfig>,
    std: Option<StdConfig>,
}

impl Logger {
    #[cfg(test)]
    fn setup_local() -> Self {
        let (subscriber, logger) = Self::build();
        Self {
            _guard: Some(tracing::subscriber::set_default(subscriber)),
            ..logger
        }
    }

    fn setup_global() -> Result<Self, LoggerError> {
        let (subscriber, logger) = Self::build();
        tracing::subscriber::set_global_default(subscriber)?;
        Ok(logger)
    }

    fn build() -> (impl tracing::Subscriber + Send + Sync, Self) {
        let (filter_layer, filter) = reload::Layer::new(default_filter());
        let (outputs_layer, outputs) = reload::Layer::new(Vec::<OutputLayer>::new());
        let subscriber = tracing_subscriber::registry()
            .with(filter_layer)
            .with(outputs_layer);
        let logger = Self {
            outputs,
            filter,
            _guard: None,
            file: None,
            std: None,
        };
        (subscriber, logger)
    }

    /// Rebuilds every output from the current configuration. Nothing changes
    /// if an output cannot be created.
    fn apply(&self) -> Result<(), LoggerError> {
        let mut layers: Vec<OutputLayer> = Vec::with_capacity(2);
        if let Some(config) = &self.file {
            layers.push(file_layer(config)?);
        }
        if let Some(config) = &self.std {
            layers.push(std_layer(config));
        }
        self.outputs.modify(|outputs| *outputs = layers)?;
        Ok(())
    }

    fn configure_file(&mut self, config: FileConfig) -> Result<(), LoggerError> {
        let previous = self.file.replace(config);
        self.apply().inspect_err(|_| self.file = previous)
    }

    fn disable_file(&mut self) -> Result<(), LoggerError> {
        self.file = None;
        self.apply()
    }

    fn configure_std(&mut self, config: StdConfig) -> Result<(), LoggerError> {
        self.std = Some(config);
        self.apply()
    }

    fn disable_std(&mut self) -> Result<(), LoggerError> {
        self.std = None;
        self.apply()
    }

    fn set_log_level(&self, level: LogLevel) -> Result<(), LoggerError> {
        let filter = EnvFilter::new(level.as_str());
        self.filter.modify(|current| *current = filter)?;
        Ok(())
    }
}

/// `RUST_LOG` directives when present, `info` otherwise.
fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(LogLevel::Info.as_str()))
}

fn std_layer(config: &StdConfig) -> OutputLayer {
    tracing_subscriber::fmt::layer()
        .with_writer(StdWriter::new(config.target))
        .with_target(true)
        .with_thread_names(true)
        .with_ansi(false)
        .boxed()
}

fn file_layer(config: &FileConfig) -> Result<OutputLayer, LoggerError> {
    let writer = FileWriter::new(config).map_err(|source| LoggerError::File {
        path: config.path.clone(),
        source,
    })?;
    Ok(tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .json()
        .boxed())
}

static LOGGER: LazyLock<Mutex<Option<Logger>>> = LazyLock::new(|| Mutex::new(None));

fn with_logger<T>(
    f: impl FnOnce(&mut Logger) -> Result<T, LoggerError>,
) -> Result<T, LoggerError> {
    let mut guard = LOGGER.lock().map_err(|_| LoggerError::LockPoisoned)?;
    let logger = guard.as_mut().ok_or(LoggerError::NotInitialized)?;
    f(logger)
}

/// Like [`with_logger`], installing the global subscriber on first use.
fn with_logger_or_init<T>(
    f: impl FnOnce(&mut Logger) -> Result<T, LoggerError>,
) -> Result<T, LoggerError> {
    let mut guard = LOGGER.lock().map_err(|_| LoggerError::LockPoisoned)?;
    if guard.is_none() {
        *guard = Some(Logger::setup_global()?);
    }
    let logger = guard.as_mut().ok_or(LoggerError::NotInitialized)?;
    f(logger)
}

/// Writes JSON lines to a file, replacing any previous file output.
pub fn logger_configure_file(config: FileConfig) -> Result<(), LoggerError> {
    with_logger_or_init(|logger| logger.configure_file(config))
}

/// Stops file output. Other outputs keep running.
pub fn logger_disable_file() -> Result<(), LoggerError> {
    with_logger(Logger::disable_file)
}

/// Writes to stdout or stderr, replacing any previous std output.
pub fn logger_configure_std(config: StdConfig) -> Result<(), LoggerError> {
    with_logger_or_init(|logger| logger.configure_std(config))
}

/// Stops std stream output. Other outputs keep running.
pub fn logger_disable_std() -> Result<(), LoggerError> {
    with_logger(Logger::disable_std)
}

pub fn logger_set_log_level(level: LogLevel) -> Result<(), LoggerError> {
    with_logger(|logger| logger.set_log_level(level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;
    use tracing::field::{Field, Visit};
    use tracing::{debug, error, info, trace, warn, Event, Subscriber};
    use tracing_subscriber::layer::Context;
    use tracing_subscriber::registry::LookupSpan;

    #[derive(Default)]
    struct MessageVisitor {
        message: Option<String>,
    }

    impl Visit for MessageVisitor {
        fn record_str(&mut self, field: &Field, value: &str) {
            if field.name() == "message" {
                self.message = Some(value.to_owned());
            }
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                self.message = Some(format!("{value:?}"));
            }
        }
    }

    /// Collects the message of every event that passes the filter.
    struct RecordingLayer {
        messages: Arc<Mutex<Vec<String>>>,
    }

    impl<S> Layer<S> for RecordingLayer
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = MessageVisitor::default();
            event.record(&mut visitor);
            if let Some(message) = visitor.message {
                self.messages.lock().unwrap().push(message);
            }
        }
    }

    fn record(logger: &Logger) -> Arc<Mutex<Vec<String>>> {
        let messages: Arc<Mutex<Vec<String>>> = Default::default();
        let layer = RecordingLayer {
            messages: Arc::clone(&messages),
        };
        logger
            .outputs
            .modify(|outputs| outputs.push(Box::new(layer)))
            .expect("Should add recording layer");
        messages
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!("TRACE".parse::<LogLevel>().unwrap(), LogLevel::Trace);
        assert_eq!(" warning ".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("error".parse::<LogLevel>().unwrap(), LogLevel::Error);
        assert!(matches!(
            "verbose".parse::<LogLevel>(),
            Err(LoggerError::InvalidLevel(_))
        ));
        assert!(LogLevel::Debug < LogLevel::Warn);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_std_output() {
        let mut logger = Logger::setup_local();
        logger
            .configure_std(StdConfig {
                target: StdTarget::Out,
            })
            .expect("Should configure std output");
        let messages = record(&logger);
        logger.set_log_level(LogLevel::Info).unwrap();

        info!("Std output test message");

        assert_eq!(*messages.lock().unwrap(), ["Std output test message"]);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_file_output_is_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logs").join("measure.log");
        let mut logger = Logger::setup_local();
        logger
            .configure_file(FileConfig::new(&path))
            .expect("Should configure file output");
        logger.set_log_level(LogLevel::Info).unwrap();

        warn!(key = "installation_id", "File output test message");
        // Dropping the logger shuts down the writer thread, which flushes.
        drop(logger);

        let content = std::fs::read_to_string(&path).unwrap();
        let line = content.lines().next().expect("Should write one line");
        assert!(line.starts_with('{') && line.ends_with('}'), "{line}");
        assert!(line.contains("File output test message"), "{line}");
        assert!(line.contains("\"key\":\"installation_id\""), "{line}");
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_failed_file_output_keeps_previous_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("measure.log");
        let mut logger = Logger::setup_local();
        logger.configure_file(FileConfig::new(&path)).unwrap();

        let result = logger.configure_file(FileConfig::new(PathBuf::new()));

        assert!(matches!(result, Err(LoggerError::File { .. })));
        assert_eq!(logger.file.as_ref().map(|c| c.path.clone()), Some(path));
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_std_and_file_together() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("measure.log");
        let mut logger = Logger::setup_local();
        logger
            .configure_std(StdConfig {
                target: StdTarget::Err,
            })
            .unwrap();
        logger.configure_file(FileConfig::new(&path)).unwrap();
        let messages = record(&logger);

        warn!("Std and file output test message");
        logger.disable_std().unwrap();

        assert_eq!(
            *messages.lock().unwrap(),
            ["Std and file output test message"]
        );
        assert!(logger.std.is_none());
        assert!(path.exists());
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_level_change() {
        let logger = Logger::setup_local();
        let messages = record(&logger);

        logger.set_log_level(LogLevel::Trace).unwrap();
        trace!("trace");
        debug!("debug");
        info!("info");
        warn!("warn");
        error!("error");
        assert_eq!(messages.lock().unwrap().len(), 5);

        messages.lock().unwrap().clear();
        logger.set_log_level(LogLevel::Warn).unwrap();
        trace!("trace");
        debug!("debug");
        info!("info");
        warn!("warn");
        error!("error");
        assert_eq!(*messages.lock().unwrap(), ["warn", "error"]);

        messages.lock().unwrap().clear();
        logger.set_log_level(LogLevel::Error).unwrap();
        warn!("warn");
        error!("error");
        assert_eq!(*messages.lock().unwrap(), ["error"]);
    }
}
