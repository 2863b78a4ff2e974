//! Core traits and types for secret sources

use std::any::Any;
use std::fmt;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::types::CancellationToken;

/// Runtime callable produced from a source configuration
///
/// Returns `None` when the source has no value. That is the normal way to
/// signal absence and lets resolution fall back to the next source.
pub type SecretGetter = Box<dyn Fn(&CancellationToken) -> Option<String> + Send + Sync>;

/// Errors raised while building a getter from its configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The provider was handed a configuration of another source type
    #[error("invalid config")]
    InvalidConfig,

    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    /// External tooling the source depends on is missing
    #[error("{0}")]
    Unavailable(String),
}

pub type SourceResult<T> = Result<T, SourceError>;

/// Typed configuration of a source, decoded from the manifest subsection
/// keyed by [`TYPE`](Self::TYPE)
///
/// `Display` must not leak the secret itself; it is used for status and
/// listing output.
pub trait TypedConfig:
    DeserializeOwned + Default + Clone + PartialEq + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// Type tag of the source, also the name of its manifest subsection
    const TYPE: &'static str;
}

/// Object-safe view over any [`TypedConfig`]
///
/// Implemented for every `TypedConfig`; there is no need to implement it
/// by hand.
pub trait SourceConfig: fmt::Debug + fmt::Display + Send + Sync {
    fn source_type(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn clone_box(&self) -> Box<dyn SourceConfig>;

    fn eq_config(&self, other: &dyn SourceConfig) -> bool;
}

impl<T: TypedConfig> SourceConfig for T {
    fn source_type(&self) -> &'static str {
        T::TYPE
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_box(&self) -> Box<dyn SourceConfig> {
        Box::new(self.clone())
    }

    fn eq_config(&self, other: &dyn SourceConfig) -> bool {
        other.as_any().downcast_ref::<T>() == Some(self)
    }
}

impl Clone for Box<dyn SourceConfig> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// A pluggable secret backend
///
/// Implementations validate their configuration in [`getter`](Self::getter)
/// and fail fast on structurally invalid input (e.g. an empty required
/// field) rather than deferring the failure to getter invocation.
///
/// # Example
///
/// ```
/// use secretchain_core::sources::{SecretGetter, SecretSource, SourceResult, StaticConfig};
/// use secretchain_core::CancellationToken;
///
/// struct Reversed;
///
/// impl SecretSource for Reversed {
///     type Config = StaticConfig;
///
///     fn description(&self) -> &'static str {
///         "Static value, reversed"
///     }
///
///     fn getter(&self, config: &StaticConfig) -> SourceResult<SecretGetter> {
///         let value: String = config.value.chars().rev().collect();
///         Ok(Box::new(move |_ctx: &CancellationToken| Some(value.clone())))
///     }
/// }
/// ```
pub trait SecretSource: Send + Sync + 'static {
    type Config: TypedConfig;

    /// Human-readable description for introspection
    fn description(&self) -> &'static str;

    /// Build the runtime getter for `config`
    fn getter(&self, config: &Self::Config) -> SourceResult<SecretGetter>;
}

/// Reject empty required fields with the conventional error
pub(crate) fn require_non_empty(field: &'static str, value: &str) -> SourceResult<()> {
    if value.is_empty() {
        return Err(SourceError::EmptyField(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{EnvConfig, StaticConfig};

    #[test]
    fn test_source_error_messages() {
        assert_eq!(SourceError::InvalidConfig.to_string(), "invalid config");
        assert_eq!(
            SourceError::EmptyField("key").to_string(),
            "key cannot be empty"
        );
    }

    #[test]
    fn test_config_object_safety() {
        let config: Box<dyn SourceConfig> = Box::new(EnvConfig::new("KEY"));
        assert_eq!(config.source_type(), "env");
        assert!(config.as_any().downcast_ref::<EnvConfig>().is_some());
        assert!(config.as_any().downcast_ref::<StaticConfig>().is_none());

        let cloned = config.clone();
        assert!(cloned.eq_config(config.as_ref()));
    }

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty("key", "VALUE").is_ok());
        assert_eq!(
            require_non_empty("key", ""),
            Err(SourceError::EmptyField("key"))
        );
    }
}
