//! Environment variable source

use std::env;
use std::fmt;

use serde::Deserialize;

use super::traits::{require_non_empty, SecretGetter, SecretSource, SourceResult, TypedConfig};
use crate::types::CancellationToken;

/// Configuration for the `env` source
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvConfig {
    /// Name of the environment variable
    pub key: String,
}

impl EnvConfig {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl TypedConfig for EnvConfig {
    const TYPE: &'static str = "env";
}

impl fmt::Display for EnvConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Source that reads an environment variable
///
/// Unset, empty and non-unicode variables count as absent. A value made
/// only of whitespace is returned as-is.
///
/// # Example
///
/// ```
/// use secretchain_core::sources::{EnvConfig, EnvSource, SecretSource};
/// use secretchain_core::CancellationToken;
///
/// std::env::set_var("DOC_EXAMPLE_TOKEN", "s3cret");
/// let getter = EnvSource.getter(&EnvConfig::new("DOC_EXAMPLE_TOKEN")).unwrap();
/// assert_eq!(getter(&CancellationToken::new()), Some("s3cret".to_string()));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSource;

impl SecretSource for EnvSource {
    type Config = EnvConfig;

    fn description(&self) -> &'static str {
        "Read a value from an environment variable"
    }

    fn getter(&self, config: &EnvConfig) -> SourceResult<SecretGetter> {
        require_non_empty("key", &config.key)?;

        let key = config.key.clone();
        Ok(Box::new(move |_ctx: &CancellationToken| {
            env::var(&key).ok().filter(|value| !value.is_empty())
        }))
    }
}
