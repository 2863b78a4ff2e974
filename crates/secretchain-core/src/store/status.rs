//! Availability reports and listings over loaded secrets

use std::sync::Arc;

use serde::Serialize;

use super::secrets::{CompiledSecret, Secrets};
use crate::types::{CancellationToken, SourceFilter};

/// Availability of one secret
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretStatus {
    pub name: String,
    pub description: String,
    /// Redacted form of the sources the filter let through
    pub sources: Vec<String>,
    pub available: bool,
}

impl SecretStatus {
    /// Serialize a report for host tooling
    pub fn to_json(statuses: &[SecretStatus]) -> serde_json::Result<String> {
        serde_json::to_string_pretty(statuses)
    }
}

fn redacted_sources(secret: &CompiledSecret, filter: Option<SourceFilter<'_>>) -> Vec<String> {
    secret
        .entry
        .sources
        .iter()
        .filter(|source| filter.map_or(true, |f| f(&source.info())))
        .map(|source| source.to_string())
        .collect()
}

/// Read-only view of a loaded secret
///
/// The value is only resolved when [`value`](Self::value) is called.
pub struct SecretView<'a> {
    secret: Arc<CompiledSecret>,
    filter: Option<SourceFilter<'a>>,
}

impl SecretView<'_> {
    pub fn name(&self) -> &str {
        &self.secret.entry.name
    }

    pub fn description(&self) -> &str {
        &self.secret.entry.description
    }

    /// Redacted sources, after the view's filter
    pub fn sources(&self) -> Vec<String> {
        redacted_sources(&self.secret, self.filter)
    }

    /// Resolve the secret with the view's filter
    pub fn value(&self, ctx: &CancellationToken) -> Option<String> {
        self.secret.resolve(ctx, self.filter)
    }
}

impl std::fmt::Debug for SecretView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretView")
            .field("name", &self.name())
            .field("sources", &self.sources())
            .finish()
    }
}

impl Secrets {
    /// Resolve every loaded secret and report which are available
    ///
    /// Sorted by name. Empty when nothing has been loaded.
    pub fn check(&self, ctx: &CancellationToken, filter: Option<SourceFilter<'_>>) -> Vec<SecretStatus> {
        self.compiled()
            .unwrap_or_default()
            .iter()
            .map(|secret| SecretStatus {
                name: secret.entry.name.clone(),
                description: secret.entry.description.clone(),
                sources: redacted_sources(secret, filter),
                available: secret.resolve(ctx, filter).is_some(),
            })
            .collect()
    }

    /// Views over every loaded secret, sorted by name
    pub fn list<'a>(&self, filter: Option<SourceFilter<'a>>) -> Vec<SecretView<'a>> {
        self.compiled()
            .unwrap_or_default()
            .into_iter()
            .map(|secret| SecretView { secret, filter })
            .collect()
    }
}

/// Availability report over the process-wide store
pub fn check_secrets(ctx: &CancellationToken, filter: Option<SourceFilter<'_>>) -> Vec<SecretStatus> {
    Secrets::global().check(ctx, filter)
}

/// Views over the process-wide store
pub fn list_secrets(filter: Option<SourceFilter<'_>>) -> Vec<SecretView<'_>> {
    Secrets::global().list(filter)
}
