//! Compiled secret store and resolution
//!
//! A [`Secrets`] handle owns the compiled form of every loaded secret. The
//! process-wide instance backs the free functions at the bottom of this
//! module; tests and embedders can create their own with [`Secrets::new`].

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::error::{SecretsError, SecretsResult};
use crate::logging::{self, SharedLogger};
use crate::manifest::{parse_manifest, ManifestFile};
use crate::sources::{global_registry, SecretGetter, SharedRegistry};
use crate::types::{CancellationToken, SecretEntry, SecretFilter, SourceFilter, SourceInfo};
use crate::{log_debug, log_error, log_warn};

/// Options applied when parsing a manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Template variables; the manifest is only rendered when non-empty
    pub variables: HashMap<String, String>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }
}

/// Filters applied by [`Secrets::assert_all`]
///
/// `secret_filter` decides which secrets are checked at all,
/// `source_filter` which of their sources may be tried.
#[derive(Clone, Copy, Default)]
pub struct AssertOptions<'a> {
    pub secret_filter: Option<SecretFilter<'a>>,
    pub source_filter: Option<SourceFilter<'a>>,
}

impl<'a> AssertOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret_filter(mut self, filter: SecretFilter<'a>) -> Self {
        self.secret_filter = Some(filter);
        self
    }

    pub fn with_source_filter(mut self, filter: SourceFilter<'a>) -> Self {
        self.source_filter = Some(filter);
        self
    }
}

pub(crate) struct CompiledSource {
    source_type: String,
    labels: Vec<String>,
    getter: SecretGetter,
}

impl CompiledSource {
    fn info(&self) -> SourceInfo<'_> {
        SourceInfo {
            source_type: &self.source_type,
            labels: &self.labels,
        }
    }
}

/// A secret whose sources have been turned into live getters
///
/// Immutable once built. `sources` is aligned 1:1 with `entry.sources`.
pub(crate) struct CompiledSecret {
    pub(crate) entry: SecretEntry,
    sources: Vec<CompiledSource>,
}

impl CompiledSecret {
    /// Walk the getters in declared order; the first value found wins
    pub(crate) fn resolve(&self, ctx: &CancellationToken, filter: Option<SourceFilter<'_>>) -> Option<String> {
        for source in &self.sources {
            if let Some(filter) = filter {
                if !filter(&source.info()) {
                    continue;
                }
            }
            if let Some(value) = (source.getter)(ctx) {
                return Some(value);
            }
        }
        None
    }
}

#[derive(Default)]
struct StoreState {
    secrets: HashMap<String, Arc<CompiledSecret>>,
    loaded: bool,
}

/// Store of compiled secrets
///
/// # Example
///
/// ```
/// use secretchain_core::sources::{ProviderRegistry, StaticConfig};
/// use secretchain_core::{CancellationToken, SecretEntry, Secrets, SourceDescriptor};
///
/// let secrets = Secrets::new(ProviderRegistry::with_builtins().shared());
/// secrets
///     .load(vec![SecretEntry::new("token").with_source(SourceDescriptor::new(StaticConfig::new("s3cr3t")))])
///     .unwrap();
///
/// assert_eq!(secrets.resolve(&CancellationToken::new(), "token"), Some("s3cr3t".to_string()));
/// ```
pub struct Secrets {
    registry: SharedRegistry,
    state: RwLock<StoreState>,
    logger: Option<SharedLogger>,
}

impl Secrets {
    /// Create an empty, unloaded store resolving source types through `registry`
    pub fn new(registry: SharedRegistry) -> Self {
        Self {
            registry,
            state: RwLock::new(StoreState::default()),
            logger: None,
        }
    }

    /// Log through `logger` instead of the process-wide logger
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The process-wide store, backed by the process-wide registry
    pub fn global() -> &'static Secrets {
        &GLOBAL
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    fn logger(&self) -> SharedLogger {
        self.logger.clone().unwrap_or_else(logging::logger)
    }

    /// Compile and commit `entries` in order
    ///
    /// Stops at the first failing entry. Entries committed before it stay in
    /// the store. A name that is already present is rejected and the
    /// existing secret is kept.
    pub fn load(&self, entries: Vec<SecretEntry>) -> SecretsResult<()> {
        for entry in entries {
            if self.state.read().secrets.contains_key(&entry.name) {
                return Err(SecretsError::Duplicated(entry.name));
            }

            let compiled = self.compile(entry)?;
            let name = compiled.entry.name.clone();

            let mut state = self.state.write();
            if state.secrets.contains_key(&name) {
                return Err(SecretsError::Duplicated(name));
            }
            log_debug!(self.logger(), "loaded secret {:?} with {} source(s)", name, compiled.sources.len());
            state.secrets.insert(name, Arc::new(compiled));
        }

        self.state.write().loaded = true;
        Ok(())
    }

    fn compile(&self, entry: SecretEntry) -> SecretsResult<CompiledSecret> {
        let registry = self.registry.read();
        let sources = entry
            .sources
            .iter()
            .map(|source| -> SecretsResult<CompiledSource> {
                let provider = registry
                    .lookup(&source.source_type)
                    .ok_or_else(|| SecretsError::UnknownSource(source.source_type.clone()))?;
                let getter = provider
                    .build(source.config.as_ref())
                    .map_err(|e| SecretsError::Build {
                        name: entry.name.clone(),
                        source_type: source.source_type.clone(),
                        source: e,
                    })?;
                Ok(CompiledSource {
                    source_type: source.source_type.clone(),
                    labels: source.labels.clone(),
                    getter,
                })
            })
            .collect::<SecretsResult<Vec<_>>>()?;
        Ok(CompiledSecret { entry, sources })
    }

    /// Parse a manifest document and load its entries
    pub fn parse_and_load(&self, document: &[u8], options: &LoadOptions) -> SecretsResult<()> {
        let entries = {
            let registry = self.registry.read();
            parse_manifest(document, &options.variables, &registry)?
        };
        self.load(entries)
    }

    /// Read a manifest file and load its entries
    ///
    /// A missing file loads nothing but still marks the store as loaded.
    pub fn load_file(&self, file: &ManifestFile, options: &LoadOptions) -> SecretsResult<()> {
        let document = file.read()?;
        self.parse_and_load(&document, options)
    }

    /// Resolve `name`, trying every source
    pub fn resolve(&self, ctx: &CancellationToken, name: &str) -> Option<String> {
        self.resolve_with(ctx, name, None)
    }

    /// Resolve `name`, trying only the sources `filter` accepts
    ///
    /// Returns `None` when nothing was found. Resolving before any load or
    /// resolving an undeclared name also returns `None` and logs why.
    pub fn resolve_with(
        &self,
        ctx: &CancellationToken,
        name: &str,
        filter: Option<SourceFilter<'_>>,
    ) -> Option<String> {
        let secret = self.lookup(name)?;
        secret.resolve(ctx, filter)
    }

    /// Snapshot of a compiled secret, logging why it is unavailable
    pub(crate) fn lookup(&self, name: &str) -> Option<Arc<CompiledSecret>> {
        let (loaded, secret) = {
            let state = self.state.read();
            (state.loaded, state.secrets.get(name).cloned())
        };

        if !loaded {
            log_warn!(self.logger(), "{}", SecretsError::NotLoaded);
            return None;
        }
        if secret.is_none() {
            log_error!(self.logger(), "unknown secret: {}", name);
        }
        secret
    }

    /// Snapshot of every compiled secret, sorted by name
    pub(crate) fn compiled(&self) -> SecretsResult<Vec<Arc<CompiledSecret>>> {
        let state = self.state.read();
        if !state.loaded {
            return Err(SecretsError::NotLoaded);
        }
        let mut secrets: Vec<_> = state.secrets.values().cloned().collect();
        drop(state);
        secrets.sort_by(|a, b| a.entry.name.cmp(&b.entry.name));
        Ok(secrets)
    }

    /// Names of the secrets that cannot be resolved
    ///
    /// Secrets rejected by the secret filter are not checked. The result is
    /// sorted by name.
    pub fn assert_all(&self, ctx: &CancellationToken, options: AssertOptions<'_>) -> SecretsResult<Vec<String>> {
        let mut missing = Vec::new();
        for secret in self.compiled()? {
            if let Some(filter) = options.secret_filter {
                if !filter(&secret.entry) {
                    continue;
                }
            }
            if secret.resolve(ctx, options.source_filter).is_none() {
                missing.push(secret.entry.name.clone());
            }
        }
        Ok(missing)
    }

    /// Declared entries of every loaded secret, sorted by name
    pub fn entries(&self) -> Vec<SecretEntry> {
        self.compiled()
            .map(|secrets| secrets.iter().map(|s| s.entry.clone()).collect())
            .unwrap_or_default()
    }

    /// Names of every loaded secret, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.read().secrets.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.state.read().secrets.contains_key(name)
    }

    pub fn is_loaded(&self) -> bool {
        self.state.read().loaded
    }

    /// Drop every secret and return to the unloaded state
    ///
    /// Intended for tests.
    pub fn reset(&self) {
        *self.state.write() = StoreState::default();
    }
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Secrets")
            .field("loaded", &state.loaded)
            .field("secrets", &state.secrets.len())
            .finish_non_exhaustive()
    }
}

static GLOBAL: Lazy<Secrets> = Lazy::new(|| Secrets::new(global_registry()));

/// Load entries into the process-wide store
pub fn load_secrets(entries: Vec<SecretEntry>) -> SecretsResult<()> {
    GLOBAL.load(entries)
}

/// Parse a manifest and load it into the process-wide store
///
/// # Example
///
/// ```
/// use secretchain_core::{get_secret, parse_and_load_secrets, CancellationToken, LoadOptions};
///
/// let manifest = br#"
/// - name: doc_example_token
///   sources:
///     - type: static
///       static:
///         value: {{ $.Token }}
/// "#;
///
/// parse_and_load_secrets(manifest, &LoadOptions::new().with_variable("Token", "abc123")).unwrap();
/// assert_eq!(
///     get_secret(&CancellationToken::new(), "doc_example_token"),
///     Some("abc123".to_string())
/// );
/// ```
pub fn parse_and_load_secrets(document: &[u8], options: &LoadOptions) -> SecretsResult<()> {
    GLOBAL.parse_and_load(document, options)
}

/// Resolve a secret from the process-wide store
pub fn get_secret(ctx: &CancellationToken, name: &str) -> Option<String> {
    GLOBAL.resolve(ctx, name)
}

/// Resolve a secret from the process-wide store, trying only accepted sources
pub fn get_secret_with(ctx: &CancellationToken, name: &str, filter: SourceFilter<'_>) -> Option<String> {
    GLOBAL.resolve_with(ctx, name, Some(filter))
}

/// Check that every secret in the process-wide store resolves
pub fn assert_secrets(ctx: &CancellationToken, options: AssertOptions<'_>) -> SecretsResult<Vec<String>> {
    GLOBAL.assert_all(ctx, options)
}

/// Empty the process-wide store
///
/// Intended for tests.
pub fn reset_secrets() {
    GLOBAL.reset();
}
