//! Logging abstractions
//!
//! Engine instances take an injected [`Logger`]; sources and anything else
//! without an instance handle log through the process-wide logger in
//! [`global`].

mod traits;
mod console;
pub mod global;

pub use traits::{Logger, LogLevel, NoOpLogger, SharedLogger};
pub use console::ConsoleLogger;

pub use global::{logger, set_logger, debug, info, warn, error};
