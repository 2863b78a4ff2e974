//! secretchain core
//!
//! Resolves named secrets by trying an ordered list of pluggable sources
//! until one produces a value. Secrets and their sources are declared in a
//! YAML manifest:
//!
//! ```yaml
//! - name: jira_token
//!   description: Token for the Jira API
//!   sources:
//!     - type: env
//!       env:
//!         key: JIRA_TOKEN
//!     - type: 1password
//!       labels: [personal]
//!       1password:
//!         ref: op://Private/Jira/token
//! ```
//!
//! ## Resolution
//!
//! ```rust,ignore
//! use secretchain_core::{get_secret_with, parse_and_load_secrets, CancellationToken, LoadOptions, SourceInfo};
//!
//! parse_and_load_secrets(&manifest, &LoadOptions::new())?;
//!
//! let ctx = CancellationToken::with_timeout(Duration::from_secs(30));
//! let not_personal = |s: &SourceInfo<'_>| !s.has_label("personal");
//! let token = get_secret_with(&ctx, "jira_token", &not_personal);
//! ```
//!
//! ## Custom sources
//!
//! Implement [`sources::SecretSource`] (or use [`sources::SourceProvider::from_fn`])
//! and register it with [`sources::register_source`] before loading a
//! manifest that refers to it.

pub mod types;
pub mod logging;
pub mod sources;
pub mod manifest;
pub mod store;

// Re-export commonly used types
pub use types::{CancellationToken, SecretEntry, SecretFilter, SourceDescriptor, SourceFilter, SourceInfo};

pub use logging::{ConsoleLogger, LogLevel, Logger, NoOpLogger, SharedLogger};

pub use sources::{
    list_sources, lookup_source, register_source, ProviderRegistry, SecretGetter, SecretSource, SourceConfig,
    SourceError, SourceProvider, TypedConfig,
};

pub use manifest::{parse_manifest, ManifestError, ManifestFile, ManifestLevel, TemplateError};

pub use store::{
    assert_secrets, check_secrets, get_secret, get_secret_with, list_secrets, load_secrets,
    parse_and_load_secrets, reset_secrets, AssertOptions, LoadOptions, SecretStatus, SecretView, Secrets,
    SecretsError, SecretsResult,
};
