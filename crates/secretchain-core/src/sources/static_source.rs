//! Fixed-value source

use std::fmt;

use serde::Deserialize;

use super::traits::{SecretGetter, SecretSource, SourceResult, TypedConfig};
use crate::types::CancellationToken;

/// Configuration for the `static` source
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticConfig {
    pub value: String,
}

impl StaticConfig {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl TypedConfig for StaticConfig {
    const TYPE: &'static str = "static";
}

/// Shows the first three characters of long values and masks the rest.
/// Values of four characters or fewer are masked entirely.
impl fmt::Display for StaticConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.value.chars().count();
        let hidden = if len > 4 { len - 3 } else { len };
        let shown: String = self.value.chars().take(len - hidden).collect();
        write!(f, "{}{}", shown, "*".repeat(hidden))
    }
}

/// Source that always yields its configured value, even an empty one
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticSource;

impl SecretSource for StaticSource {
    type Config = StaticConfig;

    fn description(&self) -> &'static str {
        "Fixed value declared in the manifest"
    }

    fn getter(&self, config: &StaticConfig) -> SourceResult<SecretGetter> {
        let value = config.value.clone();
        Ok(Box::new(move |_ctx: &CancellationToken| Some(value.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_config_display() {
        assert_eq!(StaticConfig::new("").to_string(), "");
        assert_eq!(StaticConfig::new("a").to_string(), "*");
        assert_eq!(StaticConfig::new("ab").to_string(), "**");
        assert_eq!(StaticConfig::new("abc").to_string(), "***");
        assert_eq!(StaticConfig::new("abcd").to_string(), "****");
        assert_eq!(StaticConfig::new("abcdef").to_string(), "abc***");
        assert_eq!(
            StaticConfig::new("this_is_a_long_secret").to_string(),
            "thi******************"
        );
    }

    #[test]
    fn test_static_config_display_multibyte() {
        assert_eq!(StaticConfig::new("ñandú!").to_string(), "ñan***");
    }

    #[test]
    fn test_static_getter() {
        let getter = StaticSource.getter(&StaticConfig::new("test_secret_value")).unwrap();
        assert_eq!(
            getter(&CancellationToken::new()),
            Some("test_secret_value".to_string())
        );
    }

    #[test]
    fn test_static_getter_empty_value_is_found() {
        let getter = StaticSource.getter(&StaticConfig::new("")).unwrap();
        assert_eq!(getter(&CancellationToken::new()), Some(String::new()));
    }

    #[test]
    fn test_static_config_rejects_unknown_fields() {
        let result: Result<StaticConfig, _> = serde_yaml::from_str("value: a\nextra: b");
        assert!(result.is_err());
    }
}
