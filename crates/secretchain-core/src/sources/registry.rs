//! Source provider registry: maps a source type tag to its provider

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::bash_source::BashSource;
use super::env_source::EnvSource;
use super::keychain_source::KeychainSource;
use super::onepassword_source::OnePasswordSource;
use super::static_source::StaticSource;
use super::stdin_source::StdinSource;
use super::traits::{SecretGetter, SecretSource, SourceConfig, SourceError, SourceResult, TypedConfig};

type DecodeFn = fn(serde_yaml::Value) -> Result<Box<dyn SourceConfig>, serde_yaml::Error>;
type BuildFn = Box<dyn Fn(&dyn SourceConfig) -> SourceResult<SecretGetter> + Send + Sync>;

/// Type-erased provider of a source type
///
/// Bundles how to create and decode the typed configuration with how to
/// turn a populated configuration into a getter.
pub struct SourceProvider {
    config_type: &'static str,
    description: &'static str,
    new_config: fn() -> Box<dyn SourceConfig>,
    decode: DecodeFn,
    build: BuildFn,
}

fn new_config<C: TypedConfig>() -> Box<dyn SourceConfig> {
    Box::new(C::default())
}

fn decode_config<C: TypedConfig>(value: serde_yaml::Value) -> Result<Box<dyn SourceConfig>, serde_yaml::Error> {
    let config: C = serde_yaml::from_value(value)?;
    Ok(Box::new(config))
}

impl SourceProvider {
    /// Wrap a [`SecretSource`] implementation
    pub fn new<S: SecretSource>(source: S) -> Self {
        Self {
            config_type: S::Config::TYPE,
            description: source.description(),
            new_config: new_config::<S::Config>,
            decode: decode_config::<S::Config>,
            build: Box::new(move |config: &dyn SourceConfig| {
                let typed = config
                    .as_any()
                    .downcast_ref::<S::Config>()
                    .ok_or(SourceError::InvalidConfig)?;
                source.getter(typed)
            }),
        }
    }

    /// Build a provider from a plain getter factory
    ///
    /// # Example
    ///
    /// ```
    /// use secretchain_core::sources::{SourceProvider, StaticConfig};
    /// use secretchain_core::CancellationToken;
    ///
    /// let provider = SourceProvider::from_fn("Upper-cased static value", |config: &StaticConfig| {
    ///     let value = config.value.to_uppercase();
    ///     Ok(Box::new(move |_ctx: &CancellationToken| Some(value.clone())))
    /// });
    /// assert_eq!(provider.config_type(), "static");
    /// ```
    pub fn from_fn<C, F>(description: &'static str, factory: F) -> Self
    where
        C: TypedConfig,
        F: Fn(&C) -> SourceResult<SecretGetter> + Send + Sync + 'static,
    {
        Self {
            config_type: C::TYPE,
            description,
            new_config: new_config::<C>,
            decode: decode_config::<C>,
            build: Box::new(move |config: &dyn SourceConfig| {
                let typed = config
                    .as_any()
                    .downcast_ref::<C>()
                    .ok_or(SourceError::InvalidConfig)?;
                factory(typed)
            }),
        }
    }

    /// Type tag of the configuration this provider understands
    pub fn config_type(&self) -> &'static str {
        self.config_type
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    /// An empty (default) typed configuration
    pub fn new_config(&self) -> Box<dyn SourceConfig> {
        (self.new_config)()
    }

    /// Decode a manifest subsection into this provider's typed configuration
    pub fn decode(&self, value: serde_yaml::Value) -> Result<Box<dyn SourceConfig>, serde_yaml::Error> {
        (self.decode)(value)
    }

    /// Build a getter, failing fast on invalid configuration
    pub fn build(&self, config: &dyn SourceConfig) -> SourceResult<SecretGetter> {
        (self.build)(config)
    }
}

impl std::fmt::Debug for SourceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceProvider")
            .field("config_type", &self.config_type)
            .field("description", &self.description)
            .finish()
    }
}

/// Mapping from source type tag to provider
///
/// Registration is insert-or-replace: the last registration for a tag wins,
/// which lets host applications override built-in sources.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<SourceProvider>>,
}

/// Registry shared between a store and its callers
pub type SharedRegistry = Arc<RwLock<ProviderRegistry>>;

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in sources
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("static", SourceProvider::new(StaticSource));
        registry.register("env", SourceProvider::new(EnvSource));
        registry.register("bash", SourceProvider::new(BashSource));
        registry.register("stdin", SourceProvider::new(StdinSource::new()));
        registry.register("1password", SourceProvider::new(OnePasswordSource));
        registry.register("keychain", SourceProvider::new(KeychainSource));
        registry
    }

    /// Wrap this registry for sharing with a store
    pub fn shared(self) -> SharedRegistry {
        Arc::new(RwLock::new(self))
    }

    /// Register (or replace) the provider for `tag`
    pub fn register(&mut self, tag: impl Into<String>, provider: SourceProvider) {
        self.providers.insert(tag.into(), Arc::new(provider));
    }

    /// Look up the provider registered for `tag`
    pub fn lookup(&self, tag: &str) -> Option<Arc<SourceProvider>> {
        self.providers.get(tag).cloned()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.providers.contains_key(tag)
    }

    /// All registered providers, in no particular order
    pub fn providers(&self) -> Vec<Arc<SourceProvider>> {
        self.providers.values().cloned().collect()
    }

    /// Registered tags, sorted
    pub fn source_types(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.providers.keys().cloned().collect();
        tags.sort();
        tags
    }
}

/// Process-wide registry, pre-populated with the built-in sources
static REGISTRY: Lazy<SharedRegistry> = Lazy::new(|| ProviderRegistry::with_builtins().shared());

/// Handle to the process-wide registry
pub fn global_registry() -> SharedRegistry {
    Arc::clone(&REGISTRY)
}

/// Register a source type in the process-wide registry
///
/// Call this before loading any manifest that references `tag`.
///
/// # Example
///
/// ```
/// use secretchain_core::sources::{register_source, lookup_source, SourceProvider, StaticConfig};
/// use secretchain_core::CancellationToken;
///
/// register_source(
///     "constant",
///     SourceProvider::from_fn("Always the same value", |config: &StaticConfig| {
///         let value = config.value.clone();
///         Ok(Box::new(move |_ctx: &CancellationToken| Some(value.clone())))
///     }),
/// );
/// assert!(lookup_source("constant").is_some());
/// ```
pub fn register_source(tag: &str, provider: SourceProvider) {
    REGISTRY.write().register(tag, provider);
}

/// Look up a source type in the process-wide registry
pub fn lookup_source(tag: &str) -> Option<Arc<SourceProvider>> {
    REGISTRY.read().lookup(tag)
}

/// List registered source types as `(tag, description)`, sorted by tag
pub fn list_sources() -> Vec<(String, String)> {
    let registry = REGISTRY.read();
    let mut sources: Vec<(String, String)> = registry
        .providers
        .iter()
        .map(|(tag, provider)| (tag.clone(), provider.description().to_string()))
        .collect();
    sources.sort();
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{EnvConfig, StaticConfig};
    use crate::types::CancellationToken;

    fn constant(value: &'static str) -> SourceProvider {
        SourceProvider::from_fn("constant", move |_config: &StaticConfig| {
            Ok(Box::new(move |_ctx: &CancellationToken| Some(value.to_string())))
        })
    }

    #[test]
    fn test_builtin_sources_registered() {
        let registry = ProviderRegistry::with_builtins();
        assert_eq!(
            registry.source_types(),
            vec!["1password", "bash", "env", "keychain", "static", "stdin"]
        );
        assert_eq!(registry.providers().len(), 6);
    }

    #[test]
    fn test_lookup_unknown_source() {
        let registry = ProviderRegistry::with_builtins();
        assert!(registry.lookup("nonexistent_xyz").is_none());
        assert!(!registry.contains("nonexistent_xyz"));
    }

    #[test]
    fn test_register_overwrites() {
        let mut registry = ProviderRegistry::new();
        registry.register("custom", constant("first"));
        registry.register("custom", constant("second"));

        let provider = registry.lookup("custom").unwrap();
        let getter = provider.build(&StaticConfig::default()).unwrap();
        assert_eq!(getter(&CancellationToken::new()), Some("second".to_string()));
        assert_eq!(registry.providers().len(), 1);
    }

    #[test]
    fn test_provider_decodes_typed_config() {
        let registry = ProviderRegistry::with_builtins();
        let provider = registry.lookup("env").unwrap();

        let value: serde_yaml::Value = serde_yaml::from_str("key: HOME").unwrap();
        let config = provider.decode(value).unwrap();
        assert!(config.eq_config(&EnvConfig::new("HOME")));
    }

    #[test]
    fn test_provider_new_config_is_default() {
        let provider = SourceProvider::new(EnvSource);
        let config = provider.new_config();
        assert_eq!(config.source_type(), "env");
        assert!(config.eq_config(&EnvConfig::default()));
    }

    #[test]
    fn test_provider_rejects_foreign_config() {
        let provider = SourceProvider::new(EnvSource);
        let err = provider.build(&StaticConfig::new("x")).err().unwrap();
        assert_eq!(err, SourceError::InvalidConfig);
        assert_eq!(err.to_string(), "invalid config");
    }

    #[test]
    fn test_global_register_and_list() {
        register_source("test_global_registry_source", constant("v"));

        assert!(lookup_source("test_global_registry_source").is_some());
        let tags: Vec<_> = list_sources().into_iter().map(|(tag, _)| tag).collect();
        assert!(tags.contains(&"test_global_registry_source".to_string()));
        assert!(tags.contains(&"env".to_string()));
    }
}
