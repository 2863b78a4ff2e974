//! Manifest error types

use thiserror::Error;

/// Errors raised while rendering a manifest template
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// `{{` without a matching `}}`
    #[error("unclosed action starting at byte {0}")]
    Unclosed(usize),

    /// Anything other than a plain variable reference
    #[error("unsupported action: {{{{{0}}}}}")]
    UnsupportedAction(String),

    #[error("undefined variable: {0}")]
    UndefinedVariable(String),
}

/// Errors raised while parsing a manifest document
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("parsing manifest template: {0}")]
    Template(#[from] TemplateError),

    #[error("manifest is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("unmarshaling manifest: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A source node without a `type` field
    #[error("missing source type in {secret:?}")]
    MissingType { secret: String },

    #[error("unknown source: {0}")]
    UnknownSource(String),

    /// The subsection keyed by the source type is absent
    #[error("missing provider configuration: {0}")]
    MissingSourceConfig(String),

    #[error("unmarshaling {source_type} configuration: {source}")]
    InvalidSourceConfig {
        source_type: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid labels for source {source_type}: {source}")]
    InvalidLabels {
        source_type: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("reading manifest: {0}")]
    Io(#[from] std::io::Error),
}

pub type ManifestResult<T> = Result<T, ManifestError>;
