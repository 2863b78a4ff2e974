//! 1Password CLI source

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use super::exec::{self, Stderr};
use super::traits::{require_non_empty, SecretGetter, SecretSource, SourceError, SourceResult, TypedConfig};
use crate::types::CancellationToken;

const OP_BINARY: &str = "op";

const DESKTOP_INTEGRATION_HINT: &str = "You can use 1Password by turning on the 1Password desktop app integration: \
https://developer.1password.com/docs/cli/get-started/#step-2-turn-on-the-1password-desktop-app-integration";

/// Configuration for the `1password` source
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OnePasswordConfig {
    /// Secret reference, e.g. `op://vault/item/field`
    #[serde(rename = "ref")]
    pub reference: String,
}

impl OnePasswordConfig {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
        }
    }
}

impl TypedConfig for OnePasswordConfig {
    const TYPE: &'static str = "1password";
}

impl fmt::Display for OnePasswordConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reference)
    }
}

/// Source that reads a secret reference through the `op` CLI
///
/// Building the getter fails when `op` is not on `PATH`. At call time the
/// source first checks that an account is signed in.
#[derive(Debug, Default, Clone, Copy)]
pub struct OnePasswordSource;

impl SecretSource for OnePasswordSource {
    type Config = OnePasswordConfig;

    fn description(&self) -> &'static str {
        "Read a secret reference with the 1Password CLI"
    }

    fn getter(&self, config: &OnePasswordConfig) -> SourceResult<SecretGetter> {
        require_non_empty("ref", &config.reference)?;

        let op = which::which(OP_BINARY)
            .map_err(|_| SourceError::Unavailable("1Password CLI not found".to_string()))?;
        let reference = config.reference.clone();
        Ok(Box::new(move |ctx: &CancellationToken| read_reference(ctx, &op, &reference)))
    }
}

fn read_reference(ctx: &CancellationToken, op: &Path, reference: &str) -> Option<String> {
    match exec::run(ctx, op, &["account", "list"], Stderr::Inherit) {
        Ok(accounts) if String::from_utf8_lossy(&accounts).trim().is_empty() => {
            crate::warn_log!("{}", DESKTOP_INTEGRATION_HINT);
            return None;
        }
        Ok(_) => {}
        Err(e) => {
            crate::debug_log!("1password account check failed: {}", e);
            return None;
        }
    }

    match exec::run(ctx, op, &["read", reference], Stderr::Discard) {
        Ok(out) => Some(String::from_utf8_lossy(&out).trim().to_string()),
        Err(e) => {
            crate::debug_log!("1password read failed: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_onepassword_config_display() {
        assert_eq!(
            OnePasswordConfig::new("op://vault/item/field").to_string(),
            "op://vault/item/field"
        );
    }

    #[test]
    fn test_onepassword_config_decodes_ref() {
        let config: OnePasswordConfig = serde_yaml::from_str("ref: op://vault/item/field").unwrap();
        assert_eq!(config, OnePasswordConfig::new("op://vault/item/field"));
    }

    #[test]
    fn test_onepassword_empty_ref_rejected() {
        let err = OnePasswordSource
            .getter(&OnePasswordConfig::new(""))
            .err()
            .unwrap();
        assert_eq!(err, SourceError::EmptyField("ref"));
        assert_eq!(err.to_string(), "ref cannot be empty");
    }
}
