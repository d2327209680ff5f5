// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::logger::{
    logger_configure_file, logger_configure_std, logger_set_log_level, FileConfig, LogLevel,
    LoggerError, StdConfig, StdTarget,
};
use std::fmt;
use std::path::PathBuf;

const ENV_LOG_LEVEL: &str = "MEASURE_LOG_LEVEL";
const ENV_LOG_METHOD: &str = "MEASURE_LOG_METHOD";

const LOG_METHOD_DISABLED: &str = "disabled";
const LOG_METHOD_STDOUT: &str = "stdout";
const LOG_METHOD_STDERR: &str = "stderr";
const LOG_METHOD_FILE_PREFIX: &str = "file://";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogMethod {
    Stdout,
    Stderr,
    File(PathBuf),
    #[default]
    Disabled,
}

impl LogMethod {
    /// `stdout`, `stderr`, `disabled` or `file:///path/to/file`. Anything
    /// else disables logging.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            LOG_METHOD_STDOUT => LogMethod::Stdout,
            LOG_METHOD_STDERR => LogMethod::Stderr,
            LOG_METHOD_DISABLED => LogMethod::Disabled,
            // A plain path behind the scheme, not a percent-encoded URI.
            method => match method.strip_prefix(LOG_METHOD_FILE_PREFIX) {
                Some(path) if !path.is_empty() => LogMethod::File(PathBuf::from(path)),
                _ => LogMethod::Disabled,
            },
        }
    }
}

impl fmt::Display for LogMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogMethod::Disabled => f.write_str(LOG_METHOD_DISABLED),
            LogMethod::Stdout => f.write_str(LOG_METHOD_STDOUT),
            LogMethod::Stderr => f.write_str(LOG_METHOD_STDERR),
            LogMethod::File(path) => write!(f, "{LOG_METHOD_FILE_PREFIX}{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    pub method: LogMethod,
    /// When unset, `RUST_LOG` directives apply, defaulting to `info`.
    pub level: Option<LogLevel>,
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|var| std::env::var(var).ok())
    }

    fn from_vars(get: impl Fn(&str) -> Option<String>) -> Self {
        let method = get(ENV_LOG_METHOD)
            .map(|m| LogMethod::parse(&m))
            .unwrap_or_default();
        let level = get(ENV_LOG_LEVEL)
            .filter(|l| !l.trim().is_empty())
            .and_then(|l| match l.parse() {
                Ok(level) => Some(level),
                Err(e) => {
                    eprintln!("{ENV_LOG_LEVEL}: {e}, falling back to the default level");
                    None
                }
            });
        Self { method, level }
    }

    /// Installs the global logger. A disabled method leaves the process
    /// without a subscriber.
    pub fn apply(&self) -> Result<(), LoggerError> {
        match &self.method {
            LogMethod::Disabled => return Ok(()),
            LogMethod::Stdout => logger_configure_std(StdConfig {
                target: StdTarget::Out,
            })?,
            LogMethod::Stderr => logger_configure_std(StdConfig {
                target: StdTarget::Err,
            })?,
            LogMethod::File(path) => logger_configure_file(FileConfig::new(path))?,
        }
        if let Some(level) = self.level {
            logger_set_log_level(level)?;
        }
        Ok(())
    }
}

/// Configures logging from `MEASURE_LOG_METHOD` and `MEASURE_LOG_LEVEL`.
pub fn logger_init_from_env() -> Result<(), LoggerError> {
    LogConfig::from_env().apply()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from(vars: &[(&str, &str)]) -> LogConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        LogConfig::from_vars(|var| vars.get(var).cloned())
    }

    #[test]
    fn test_parse_log_method() {
        assert_eq!(LogMethod::parse("stdout"), LogMethod::Stdout);
        assert_eq!(LogMethod::parse(" stderr "), LogMethod::Stderr);
        assert_eq!(LogMethod::parse("disabled"), LogMethod::Disabled);
        assert_eq!(
            LogMethod::parse("file:///var/log/measure.log"),
            LogMethod::File(PathBuf::from("/var/log/measure.log"))
        );
        assert_eq!(LogMethod::parse("file://"), LogMethod::Disabled);
        assert_eq!(LogMethod::parse("syslog"), LogMethod::Disabled);
    }

    #[test]
    fn test_log_method_display_parses_back() {
        for method in [
            LogMethod::Stdout,
            LogMethod::Stderr,
            LogMethod::Disabled,
            LogMethod::File(PathBuf::from("/tmp/measure.log")),
        ] {
            assert_eq!(LogMethod::parse(&method.to_string()), method);
        }
    }

    #[test]
    fn test_config_from_vars() {
        assert_eq!(from(&[]), LogConfig::default());

        let config = from(&[(ENV_LOG_METHOD, "stderr"), (ENV_LOG_LEVEL, "DEBUG")]);
        assert_eq!(config.method, LogMethod::Stderr);
        assert_eq!(config.level, Some(LogLevel::Debug));

        let config = from(&[(ENV_LOG_LEVEL, "loud")]);
        assert_eq!(config.level, None);
    }

    #[test]
    fn test_disabled_config_installs_nothing() {
        assert!(LogConfig::default().apply().is_ok());
    }
}
