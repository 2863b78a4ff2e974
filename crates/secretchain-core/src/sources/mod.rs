//! Pluggable secret sources
//!
//! This module provides:
//! - `SecretSource` and `TypedConfig` traits for implementing custom sources
//! - Built-in sources: `static`, `env`, `bash`, `stdin`, `1password`, `keychain`
//! - A registry mapping source type tags to providers

mod traits;
mod registry;
mod exec;
mod static_source;
mod env_source;
mod bash_source;
mod stdin_source;
mod onepassword_source;
mod keychain_source;

pub use traits::{SecretGetter, SecretSource, SourceConfig, SourceError, SourceResult, TypedConfig};
pub use registry::{
    global_registry, list_sources, lookup_source, register_source, ProviderRegistry, SharedRegistry,
    SourceProvider,
};
pub use static_source::{StaticConfig, StaticSource};
pub use env_source::{EnvConfig, EnvSource};
pub use bash_source::{BashConfig, BashSource};
pub use stdin_source::{PromptReader, StdinConfig, StdinSource};
pub use onepassword_source::{OnePasswordConfig, OnePasswordSource};
pub use keychain_source::{KeychainConfig, KeychainSource, DEFAULT_SERVICE};
