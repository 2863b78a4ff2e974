//! Console logger implementation

use std::env;

use super::traits::{LogLevel, Logger};

/// Environment variable holding the default minimum level
pub const LOG_LEVEL_ENV: &str = "SECRETCHAIN_LOG_LEVEL";

/// A logger that writes to stderr
///
/// Everything goes to stderr so that stdout stays usable for secret values.
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    prefix: String,
    min_level: LogLevel,
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleLogger {
    /// Create a console logger at `warn` level with the default prefix
    pub fn new() -> Self {
        Self {
            prefix: "[secretchain]".to_string(),
            min_level: LogLevel::Warn,
        }
    }

    /// Create a console logger whose level comes from `SECRETCHAIN_LOG_LEVEL`
    ///
    /// Unset or unparsable values fall back to `warn`.
    pub fn from_env() -> Self {
        let min_level = env::var(LOG_LEVEL_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(LogLevel::Warn);
        Self::new().with_level(min_level)
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_level(mut self, min_level: LogLevel) -> Self {
        self.min_level = min_level;
        self
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Check whether messages at `level` would be written
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    fn format(&self, level: LogLevel, message: &str) -> String {
        format!("{} {}: {}", self.prefix, level, message)
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, level: LogLevel, message: &str) {
        if self.enabled(level) {
            eprintln!("{}", self.format(level, message));
        }
    }
}
