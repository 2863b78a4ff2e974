//! OS keychain source
//!
//! Uses the platform credential store through the `keyring` crate:
//! macOS Keychain, Windows Credential Manager, Secret Service on Linux.

use std::fmt;

use serde::Deserialize;

use super::traits::{require_non_empty, SecretGetter, SecretSource, SourceResult, TypedConfig};
use crate::types::CancellationToken;

/// Service name used when the config leaves it empty
pub const DEFAULT_SERVICE: &str = "secretchain";

/// Configuration for the `keychain` source
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeychainConfig {
    pub service: String,
    pub account: String,
}

impl KeychainConfig {
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            service: String::new(),
            account: account.into(),
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Service name with the default applied
    pub fn service(&self) -> &str {
        if self.service.is_empty() {
            DEFAULT_SERVICE
        } else {
            &self.service
        }
    }
}

impl TypedConfig for KeychainConfig {
    const TYPE: &'static str = "keychain";
}

impl fmt::Display for KeychainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.service(), self.account)
    }
}

/// Source that reads a password entry from the OS keychain
#[derive(Debug, Default, Clone, Copy)]
pub struct KeychainSource;

impl SecretSource for KeychainSource {
    type Config = KeychainConfig;

    fn description(&self) -> &'static str {
        "Read a password from the OS keychain"
    }

    fn getter(&self, config: &KeychainConfig) -> SourceResult<SecretGetter> {
        require_non_empty("account", &config.account)?;

        let service = config.service().to_string();
        let account = config.account.clone();
        Ok(Box::new(move |_ctx: &CancellationToken| read_password(&service, &account)))
    }
}

fn read_password(service: &str, account: &str) -> Option<String> {
    let entry = match keyring::Entry::new(service, account) {
        Ok(entry) => entry,
        Err(e) => {
            crate::debug_log!("keychain entry {}/{} unavailable: {:?}", service, account, e);
            return None;
        }
    };

    match entry.get_password() {
        Ok(password) if !password.is_empty() => Some(password),
        Ok(_) => None,
        Err(keyring::Error::NoEntry) => {
            crate::debug_log!("keychain entry {}/{} not found", service, account);
            None
        }
        Err(e) => {
            crate::warn_log!("keychain read {}/{} failed: {}", service, account, e);
            None
        }
    }
}
