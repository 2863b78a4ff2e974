//! Filter predicates applied during resolution

use super::manifest::SecretEntry;

/// What a source filter gets to see about a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceInfo<'a> {
    pub source_type: &'a str,
    pub labels: &'a [String],
}

impl SourceInfo<'_> {
    /// Check whether the source carries `label`
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// Inclusion gate over sources: `false` skips the source without invoking it
pub type SourceFilter<'a> = &'a dyn Fn(&SourceInfo<'_>) -> bool;

/// Inclusion gate over whole secrets, used by bulk checks
pub type SecretFilter<'a> = &'a dyn Fn(&SecretEntry) -> bool;
