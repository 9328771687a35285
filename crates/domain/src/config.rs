//! Configuration structures
//!
//! Loaded by `storedesk-infra::config` from the environment or from a JSON /
//! TOML file. Every section has defaults so partial files are accepted.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{DEFAULT_BASE_URL, DEFAULT_KEYCHAIN_SERVICE, DEFAULT_TIMEOUT_MS};
use crate::errors::StoreDeskError;

/// Root application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub credentials: CredentialConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    pub base_url: String,
    /// Per-request timeout in milliseconds, never zero
    #[serde(deserialize_with = "deserialize_timeout_ms")]
    pub timeout_ms: u64,
    /// Overrides the default `storedesk/<version>` user agent
    pub user_agent: Option<String>,
}

impl ApiConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Accept a per-request timeout only if it is non-zero
///
/// # Errors
/// Returns `StoreDeskError::Config` for a zero timeout.
pub fn validate_timeout_ms(timeout_ms: u64) -> Result<u64, StoreDeskError> {
    if timeout_ms == 0 {
        return Err(StoreDeskError::Config("timeout_ms must be greater than zero".into()));
    }
    Ok(timeout_ms)
}

fn deserialize_timeout_ms<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let timeout_ms = u64::deserialize(deserializer)?;
    validate_timeout_ms(timeout_ms).map_err(serde::de::Error::custom)
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: None,
        }
    }
}

/// Where the credential pair is persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    /// Process lifetime only
    Memory,
    /// JSON file on disk
    #[default]
    File,
    /// Platform keychain
    Keychain,
}

impl FromStr for CredentialBackend {
    type Err = StoreDeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "keychain" => Ok(Self::Keychain),
            other => Err(StoreDeskError::Config(format!("Unknown credential backend: {other}"))),
        }
    }
}

impl fmt::Display for CredentialBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Memory => "memory",
            Self::File => "file",
            Self::Keychain => "keychain",
        };
        f.write_str(name)
    }
}

/// Credential store settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialConfig {
    pub backend: CredentialBackend,
    /// File path for the `file` backend; `None` resolves under `$HOME`
    pub path: Option<String>,
    /// Keychain service name for the `keychain` backend
    pub service_name: String,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            backend: CredentialBackend::default(),
            path: None,
            service_name: DEFAULT_KEYCHAIN_SERVICE.to_string(),
        }
    }
}
