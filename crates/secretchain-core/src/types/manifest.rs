//! Declared secrets and their source descriptors

use std::fmt;

use crate::sources::{SourceConfig, TypedConfig};
use super::filter::SourceInfo;

/// One configured backend attempt in a secret's fallback chain
///
/// The `config` payload is only meaningful to the provider registered under
/// `source_type`.
#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    /// Tag of the provider that handles this source (e.g. `env`)
    pub source_type: String,
    /// Free-form labels used by filter predicates
    pub labels: Vec<String>,
    /// Decoded, provider-specific configuration
    pub config: Box<dyn SourceConfig>,
}

impl SourceDescriptor {
    /// Describe a source from a typed configuration
    ///
    /// The provider tag defaults to the configuration's own type tag.
    ///
    /// # Example
    ///
    /// ```
    /// use secretchain_core::sources::EnvConfig;
    /// use secretchain_core::SourceDescriptor;
    ///
    /// let source = SourceDescriptor::new(EnvConfig::new("API_TOKEN")).with_labels(["ci"]);
    /// assert_eq!(source.source_type, "env");
    /// assert_eq!(source.to_string(), "env: API_TOKEN");
    /// ```
    pub fn new<C: TypedConfig>(config: C) -> Self {
        Self {
            source_type: C::TYPE.to_string(),
            labels: Vec::new(),
            config: Box::new(config),
        }
    }

    /// Describe a source from an already decoded configuration
    pub fn from_parts(
        source_type: impl Into<String>,
        labels: Vec<String>,
        config: Box<dyn SourceConfig>,
    ) -> Self {
        Self {
            source_type: source_type.into(),
            labels,
            config,
        }
    }

    /// Attach labels
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// The `(type, labels)` view filter predicates operate on
    pub fn info(&self) -> SourceInfo<'_> {
        SourceInfo {
            source_type: &self.source_type,
            labels: &self.labels,
        }
    }
}

impl PartialEq for SourceDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.source_type == other.source_type
            && self.labels == other.labels
            && self.config.eq_config(other.config.as_ref())
    }
}

/// Redacted, human-readable form used by status and listing output
impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source_type, self.config)
    }
}

/// A named secret with its ordered sources
///
/// Source order is the fallback order.
#[derive(Debug, Clone, PartialEq)]
pub struct SecretEntry {
    pub name: String,
    pub description: String,
    pub sources: Vec<SourceDescriptor>,
}

impl SecretEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            sources: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a source at the end of the fallback chain
    pub fn with_source(mut self, source: SourceDescriptor) -> Self {
        self.sources.push(source);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{EnvConfig, StaticConfig};

    #[test]
    fn test_descriptor_defaults_to_config_type() {
        let source = SourceDescriptor::new(StaticConfig::new("abcdef"));
        assert_eq!(source.source_type, "static");
        assert!(source.labels.is_empty());
        assert_eq!(source.to_string(), "static: abc***");
    }

    #[test]
    fn test_descriptor_equality() {
        let a = SourceDescriptor::new(EnvConfig::new("A")).with_labels(["dev"]);
        let b = SourceDescriptor::new(EnvConfig::new("A")).with_labels(["dev"]);
        let c = SourceDescriptor::new(EnvConfig::new("B")).with_labels(["dev"]);
        let d = SourceDescriptor::new(EnvConfig::new("A"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);

        // Same payload shape, different config type
        let e = SourceDescriptor::new(StaticConfig::new("A")).with_labels(["dev"]);
        assert_ne!(a, e);
    }

    #[test]
    fn test_entry_builder_keeps_source_order() {
        let entry = SecretEntry::new("token")
            .with_description("API token")
            .with_source(SourceDescriptor::new(EnvConfig::new("FIRST")))
            .with_source(SourceDescriptor::new(EnvConfig::new("SECOND")));

        assert_eq!(entry.name, "token");
        assert_eq!(entry.description, "API token");
        let rendered: Vec<_> = entry.sources.iter().map(|s| s.to_string()).collect();
        assert_eq!(rendered, vec!["env: FIRST", "env: SECOND"]);
    }

    #[test]
    fn test_descriptor_info() {
        let source = SourceDescriptor::new(EnvConfig::new("A")).with_labels(["dev", "ci"]);
        let info = source.info();
        assert_eq!(info.source_type, "env");
        assert_eq!(info.labels, &["dev".to_string(), "ci".to_string()]);
    }
}
