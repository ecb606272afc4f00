//! Configuration management for keychain-cli

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding the configured account
pub const ACCOUNT_ENV: &str = "KEYCHAIN_CLI_ACCOUNT";

/// keychain-cli configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Keychain service under which the key index is stored
    #[serde(default = "default_index_service")]
    pub index_service: String,

    /// Account every entry is scoped to (defaults to the current user)
    #[serde(default)]
    pub account: Option<String>,

    /// Character used to mask secrets in confirmations
    #[serde(default = "default_mask_char")]
    pub mask_char: char,
}

fn default_index_service() -> String {
    "keychain-cli-keys".to_string()
}

fn default_mask_char() -> char {
    '*'
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index_service: default_index_service(),
            account: None,
            mask_char: default_mask_char(),
        }
    }
}

impl Config {
    /// Load config from file, falling back to defaults when it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Resolve the account: `KEYCHAIN_CLI_ACCOUNT`, then the configured
    /// account, then `USER`, then `USERNAME`.
    pub fn resolve_account<F>(&self, env: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = |name: &str| env(name).filter(|v| !v.is_empty());

        from_env(ACCOUNT_ENV)
            .or_else(|| self.account.clone().filter(|a| !a.is_empty()))
            .or_else(|| from_env("USER"))
            .or_else(|| from_env("USERNAME"))
            .unwrap_or_else(|| "unknown".to_string())
    }
}
