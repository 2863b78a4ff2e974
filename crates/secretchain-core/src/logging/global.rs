//! Process-wide logger
//!
//! Used by code that has no engine handle to log through, such as source
//! getters. Defaults to a [`ConsoleLogger`] configured from the environment
//! and can be replaced by the host application.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::console::ConsoleLogger;
use super::traits::{LogLevel, SharedLogger};

static LOGGER: Lazy<RwLock<SharedLogger>> =
    Lazy::new(|| RwLock::new(Arc::new(ConsoleLogger::from_env())));

/// Current process-wide logger
pub fn logger() -> SharedLogger {
    Arc::clone(&LOGGER.read())
}

/// Replace the process-wide logger
pub fn set_logger(logger: SharedLogger) {
    *LOGGER.write() = logger;
}

/// Log a message at the specified level
pub fn log(level: LogLevel, message: &str) {
    logger().log(level, message);
}

pub fn debug(message: &str) {
    log(LogLevel::Debug, message);
}

pub fn info(message: &str) {
    log(LogLevel::Info, message);
}

pub fn warn(message: &str) {
    log(LogLevel::Warn, message);
}

pub fn error(message: &str) {
    log(LogLevel::Error, message);
}

/// Format and log through the process-wide logger
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        $crate::logging::global::debug(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        $crate::logging::global::info(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        $crate::logging::global::warn(&format!($($arg)*))
    };
}

#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => {
        $crate::logging::global::error(&format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging() {
        // Just make sure it doesn't panic
        debug("test message");
        info("test message");
        warn("test message");
        error("test message");
        debug_log!("formatted {}", 42);
    }
}
