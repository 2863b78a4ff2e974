//! Secret store error types

use thiserror::Error;

use crate::manifest::ManifestError;
use crate::sources::SourceError;

/// Errors raised while loading or checking secrets
#[derive(Error, Debug)]
pub enum SecretsError {
    #[error("parsing manifest: {0}")]
    Parse(#[from] ManifestError),

    /// No provider is registered for a declared source type
    #[error("unknown source: {0}")]
    UnknownSource(String),

    /// A provider rejected the configuration of one of the secret's sources
    #[error("building source {source_type} for {name:?}: {source}")]
    Build {
        name: String,
        source_type: String,
        #[source]
        source: SourceError,
    },

    #[error("duplicated declaration for {0:?}")]
    Duplicated(String),

    #[error("secrets haven't been loaded yet")]
    NotLoaded,
}

pub type SecretsResult<T> = Result<T, SecretsError>;
