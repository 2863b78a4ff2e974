//! Manifest document decoding
//!
//! Each source node is decoded in two steps: its `type` tag is read first
//! and looked up in the registry, then the subsection keyed by that same
//! tag is decoded strictly against the provider's typed configuration.

use std::collections::HashMap;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use super::error::{ManifestError, ManifestResult};
use super::template;
use crate::sources::ProviderRegistry;
use crate::types::{SecretEntry, SourceDescriptor};

const TYPE_KEY: &str = "type";
const LABELS_KEY: &str = "labels";

#[derive(Debug, Deserialize)]
struct RawEntry {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    sources: Vec<Mapping>,
}

/// Parse a manifest document into its declared secrets
///
/// When `variables` is non-empty the document is rendered as a template
/// first. Entry and source order are preserved.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use secretchain_core::manifest::parse_manifest;
/// use secretchain_core::sources::ProviderRegistry;
///
/// let manifest = br#"
/// - name: api_token
///   sources:
///     - type: env
///       env:
///         key: API_TOKEN
/// "#;
///
/// let entries = parse_manifest(manifest, &HashMap::new(), &ProviderRegistry::with_builtins()).unwrap();
/// assert_eq!(entries[0].name, "api_token");
/// assert_eq!(entries[0].sources[0].to_string(), "env: API_TOKEN");
/// ```
pub fn parse_manifest(
    document: &[u8],
    variables: &HashMap<String, String>,
    registry: &ProviderRegistry,
) -> ManifestResult<Vec<SecretEntry>> {
    let document = std::str::from_utf8(document)?;
    let rendered;
    let document = if variables.is_empty() {
        document
    } else {
        rendered = template::render(document, variables)?;
        rendered.as_str()
    };

    if document.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: Value = serde_yaml::from_str(document)?;
    if value.is_null() {
        return Ok(Vec::new());
    }

    let raw: Vec<RawEntry> = serde_yaml::from_value(value)?;
    raw.into_iter()
        .map(|entry| -> ManifestResult<SecretEntry> {
            let sources = entry
                .sources
                .iter()
                .map(|node| parse_source(&entry.name, node, registry))
                .collect::<ManifestResult<Vec<_>>>()?;
            Ok(SecretEntry {
                name: entry.name,
                description: entry.description,
                sources,
            })
        })
        .collect()
}

fn parse_source(secret: &str, node: &Mapping, registry: &ProviderRegistry) -> ManifestResult<SourceDescriptor> {
    let source_type = node
        .get(TYPE_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| ManifestError::MissingType {
            secret: secret.to_string(),
        })?;

    let provider = registry
        .lookup(source_type)
        .ok_or_else(|| ManifestError::UnknownSource(source_type.to_string()))?;

    let labels = match node.get(LABELS_KEY) {
        None | Some(Value::Null) => Vec::new(),
        Some(labels) => serde_yaml::from_value(labels.clone()).map_err(|source| ManifestError::InvalidLabels {
            source_type: source_type.to_string(),
            source,
        })?,
    };

    let payload = match node.get(source_type) {
        None => return Err(ManifestError::MissingSourceConfig(source_type.to_string())),
        // `<tag>:` with nothing under it leaves every field at its default
        Some(Value::Null) => Value::Mapping(Mapping::new()),
        Some(payload) => payload.clone(),
    };
    let config = provider
        .decode(payload)
        .map_err(|source| ManifestError::InvalidSourceConfig {
            source_type: source_type.to_string(),
            source,
        })?;

    Ok(SourceDescriptor::from_parts(source_type, labels, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{BashConfig, EnvConfig, StaticConfig};

    const JIRA_MANIFEST: &str = r#"
- name: jira_token
  description: Token for the Jira API
  sources:
    - type: env
      env:
        key: JIRA_TOKEN
    - type: bash
      labels: [deprecated]
      bash:
        command: cat ~/.jira/token
- name: github_token
  sources:
    - type: static
      static:
        value: ghp_example
"#;

    fn parse(document: &str) -> ManifestResult<Vec<SecretEntry>> {
        parse_with(document, &HashMap::new())
    }

    fn parse_with(document: &str, variables: &HashMap<String, String>) -> ManifestResult<Vec<SecretEntry>> {
        parse_manifest(document.as_bytes(), variables, &ProviderRegistry::with_builtins())
    }

    #[test]
    fn test_parse_manifest() {
        let entries = parse(JIRA_MANIFEST).unwrap();
        assert_eq!(entries.len(), 2);

        let jira = &entries[0];
        assert_eq!(jira.name, "jira_token");
        assert_eq!(jira.description, "Token for the Jira API");
        assert_eq!(jira.sources.len(), 2);
        assert_eq!(jira.sources[0].source_type, "env");
        assert!(jira.sources[0].labels.is_empty());
        assert_eq!(jira.sources[1].source_type, "bash");
        assert_eq!(jira.sources[1].labels, vec!["deprecated".to_string()]);
        assert_eq!(jira.sources[1].to_string(), "bash: cat ~/.jira/token");

        let github = &entries[1];
        assert_eq!(github.description, "");
        assert_eq!(github.sources[0].to_string(), "static: ghp********");
    }

    #[test]
    fn test_parsed_matches_programmatic() {
        let expected = vec![
            SecretEntry::new("jira_token")
                .with_description("Token for the Jira API")
                .with_source(SourceDescriptor::new(EnvConfig::new("JIRA_TOKEN")))
                .with_source(
                    SourceDescriptor::new(BashConfig::new("cat ~/.jira/token")).with_labels(["deprecated"]),
                ),
            SecretEntry::new("github_token")
                .with_source(SourceDescriptor::new(StaticConfig::new("ghp_example"))),
        ];
        assert_eq!(parse(JIRA_MANIFEST).unwrap(), expected);
    }

    #[test]
    fn test_parse_renders_variables() {
        let manifest = r#"
- name: test_secret
  sources:
    - type: env
      env:
        key: {{ $.EnvKey }}
"#;
        let variables = HashMap::from([("EnvKey".to_string(), "X".to_string())]);
        let entries = parse_with(manifest, &variables).unwrap();
        assert!(entries[0].sources[0].config.eq_config(&EnvConfig::new("X")));
    }

    #[test]
    fn test_parse_undefined_variable() {
        let manifest = "- name: s\n  sources:\n    - type: env\n      env:\n        key: {{ $.Nope }}\n";
        let variables = HashMap::from([("EnvKey".to_string(), "X".to_string())]);
        let err = parse_with(manifest, &variables).unwrap_err();
        assert!(matches!(err, ManifestError::Template(_)));
        assert_eq!(err.to_string(), "parsing manifest template: undefined variable: Nope");
    }

    #[test]
    fn test_parse_rejects_invalid_utf8_with_or_without_variables() {
        let manifest: &[u8] = b"- name: s\n  sources:\n    - type: static\n      static:\n        value: ab\xff\xfecd\n";
        let registry = ProviderRegistry::with_builtins();
        let variables = HashMap::from([("Unused".to_string(), "x".to_string())]);

        let err = parse_manifest(manifest, &variables, &registry).unwrap_err();
        assert!(matches!(err, ManifestError::Encoding(_)));
        let err = parse_manifest(manifest, &HashMap::new(), &registry).unwrap_err();
        assert!(matches!(err, ManifestError::Encoding(_)));
    }

    #[test]
    fn test_parse_without_variables_leaves_braces_alone() {
        // Not rendered when no variables are supplied, so the key is not a string
        let manifest = "- name: s\n  sources:\n    - type: env\n      env:\n        key: {{ $.EnvKey }}\n";
        assert!(parse(manifest).is_err());
    }

    #[test]
    fn test_parse_zero_sources() {
        let entries = parse("- name: lonely\n  description: never resolves\n").unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].sources.is_empty());
    }

    #[test]
    fn test_parse_missing_source_config() {
        let err = parse("- name: s\n  sources:\n    - type: env\n").unwrap_err();
        assert!(matches!(err, ManifestError::MissingSourceConfig(ref tag) if tag == "env"));
        assert_eq!(err.to_string(), "missing provider configuration: env");
    }

    #[test]
    fn test_parse_unknown_source() {
        let err = parse("- name: s\n  sources:\n    - type: unknown_source\n").unwrap_err();
        assert_eq!(err.to_string(), "unknown source: unknown_source");
    }

    #[test]
    fn test_parse_missing_type() {
        let err = parse("- name: s\n  sources:\n    - env:\n        key: A\n").unwrap_err();
        assert!(matches!(err, ManifestError::MissingType { .. }));
    }

    #[test]
    fn test_parse_rejects_unknown_config_fields() {
        let err = parse("- name: s\n  sources:\n    - type: env\n      env:\n        name: A\n").unwrap_err();
        assert!(matches!(err, ManifestError::InvalidSourceConfig { ref source_type, .. } if source_type == "env"));
    }

    #[test]
    fn test_parse_empty_subsection_uses_defaults() {
        let entries = parse("- name: s\n  sources:\n    - type: static\n      static:\n").unwrap();
        assert!(entries[0].sources[0].config.eq_config(&StaticConfig::default()));
    }

    #[test]
    fn test_parse_invalid_labels() {
        let err = parse("- name: s\n  sources:\n    - type: static\n      labels: {a: b}\n      static:\n        value: v\n")
            .unwrap_err();
        assert!(matches!(err, ManifestError::InvalidLabels { .. }));
    }

    #[test]
    fn test_parse_empty_documents() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("---\n").unwrap().is_empty());
        assert!(parse("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_uses_given_registry() {
        let err = parse_manifest(
            b"- name: s\n  sources:\n    - type: env\n      env:\n        key: A\n",
            &HashMap::new(),
            &ProviderRegistry::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ManifestError::UnknownSource(_)));
    }
}
