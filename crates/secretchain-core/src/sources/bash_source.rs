//! Shell command source

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use super::exec::{self, Stderr};
use super::traits::{require_non_empty, SecretGetter, SecretSource, SourceResult, TypedConfig};
use crate::types::CancellationToken;

const SHELL: &str = "/bin/bash";

/// Configuration for the `bash` source
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BashConfig {
    /// Command line handed to `bash -c`
    pub command: String,
    /// Per-invocation timeout in milliseconds; 0 means no timeout
    pub timeout_ms: u64,
}

impl BashConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timeout_ms: 0,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

impl TypedConfig for BashConfig {
    const TYPE: &'static str = "bash";
}

impl fmt::Display for BashConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command)
    }
}

/// Source that runs a shell command and takes its trimmed stdout
///
/// A non-zero exit, a spawn failure, a timeout or cancellation all count
/// as absent. The command's stderr goes to the caller's stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct BashSource;

impl SecretSource for BashSource {
    type Config = BashConfig;

    fn description(&self) -> &'static str {
        "Run a bash command and use its output"
    }

    fn getter(&self, config: &BashConfig) -> SourceResult<SecretGetter> {
        require_non_empty("command", &config.command)?;

        let command = config.command.clone();
        let timeout = config.timeout();
        Ok(Box::new(move |ctx: &CancellationToken| {
            let ctx = match timeout {
                Some(timeout) => ctx.child_with_timeout(timeout),
                None => ctx.clone(),
            };
            match exec::run(&ctx, SHELL, &["-c", command.as_str()], Stderr::Inherit) {
                Ok(out) => Some(String::from_utf8_lossy(&out).trim().to_string()),
                Err(e) => {
                    crate::debug_log!("bash source failed: {}", e);
                    None
                }
            }
        }))
    }
}
