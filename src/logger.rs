//! Logger facade configured from the `logger` section.
//!
//! Formatting and output belong to `tracing`; this type only holds the
//! configured switches and routes messages accordingly.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;
use serde_yaml::Value;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

pub const DEFAULT_FLAVOR: &str = "default";

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown logger threshold '{0}' (expected debug, verbose, info, warning or error)")]
    UnknownThreshold(String),

    #[error("failed writing log file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Raised(String),
}

/// Normalized bundle handed to [`Logger::configure`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggerSettings {
    pub activated: bool,
    pub strings: Option<Value>,
    pub output_path: Option<PathBuf>,
    /// `None` means unset: every level is displayed.
    pub threshold: Option<String>,
    pub triggers_exceptions: bool,
    pub flavor: String,
    pub title_flavor: String,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            activated: true,
            strings: None,
            output_path: None,
            threshold: None,
            triggers_exceptions: true,
            flavor: DEFAULT_FLAVOR.to_string(),
            title_flavor: DEFAULT_FLAVOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Verbose,
    Info,
    Warning,
    Error,
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "verbose" => Ok(LogLevel::Verbose),
            "info" => Ok(LogLevel::Info),
            "warning" | "warn" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            _ => Err(LoggerError::UnknownThreshold(s.to_string())),
        }
    }
}

impl LogLevel {
    fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::TRACE,
            LogLevel::Verbose => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warning => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Logger {
    settings: LoggerSettings,
    threshold: Option<LogLevel>,
    configured: bool,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configure(&mut self, settings: LoggerSettings) -> Result<(), LoggerError> {
        let threshold = settings.threshold.as_deref().map(LogLevel::from_str).transpose()?;
        tracing::debug!(
            activated = settings.activated,
            threshold = ?settings.threshold,
            "logger configured"
        );
        self.threshold = threshold;
        self.settings = settings;
        self.configured = true;
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn settings(&self) -> &LoggerSettings {
        &self.settings
    }

    /// Level filter for the process subscriber. Off when deactivated.
    pub fn level_filter(&self) -> LevelFilter {
        if !self.settings.activated {
            return LevelFilter::OFF;
        }
        self.threshold.map(LogLevel::filter).unwrap_or(LevelFilter::TRACE)
    }

    fn displays(&self, level: LogLevel) -> bool {
        self.settings.activated && self.threshold.map_or(true, |min| level >= min)
    }

    /// Emit a titled message, mirrored to `output_path` when one is set.
    pub fn write(&self, message: &str, title: &str) -> Result<(), LoggerError> {
        if !self.settings.activated {
            return Ok(());
        }
        tracing::info!(title, "{}", message);
        self.append(&format!("[{}] {}", title, message))
    }

    /// Emit at `level`. Errors become `Err` when `triggers_exceptions` is on.
    pub fn log(&self, level: LogLevel, message: &str) -> Result<(), LoggerError> {
        if self.displays(level) {
            match level {
                LogLevel::Debug => tracing::trace!("{}", message),
                LogLevel::Verbose => tracing::debug!("{}", message),
                LogLevel::Info => tracing::info!("{}", message),
                LogLevel::Warning => tracing::warn!("{}", message),
                LogLevel::Error => tracing::error!("{}", message),
            }
            self.append(message)?;
        }
        if level == LogLevel::Error && self.settings.triggers_exceptions {
            return Err(LoggerError::Raised(message.to_string()));
        }
        Ok(())
    }

    fn append(&self, line: &str) -> Result<(), LoggerError> {
        let Some(path) = &self.settings.output_path else {
            return Ok(());
        };
        let io_err = |source| LoggerError::Io { path: path.clone(), source };
        let mut file = OpenOptions::new().create(true).append(true).open(path).map_err(io_err)?;
        writeln!(file, "{}", line).map_err(io_err)
    }
}
