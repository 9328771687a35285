//! Credential store backed by the platform keychain
//!
//! Each key becomes one keychain entry under a shared service name
//! (macOS Keychain, Windows Credential Manager, Linux Secret Service).

use async_trait::async_trait;
use keyring::Entry;
use tracing::{debug, warn};

use super::store::{CredentialStore, CredentialStoreError};

/// Credential store persisting each key as a keychain entry
#[derive(Debug, Clone)]
pub struct KeychainCredentialStore {
    service_name: String,
}

impl KeychainCredentialStore {
    /// Create a store for a specific service
    ///
    /// # Arguments
    /// * `service_name` - Service identifier (e.g., "StoreDesk.api")
    pub fn new(service_name: impl Into<String>) -> Self {
        Self { service_name: service_name.into() }
    }

    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    fn entry(&self, key: &str) -> Result<Entry, CredentialStoreError> {
        Entry::new(&self.service_name, key).map_err(|e| {
            CredentialStoreError::Unavailable(format!("Failed to open keychain entry {key}: {e}"))
        })
    }
}

#[async_trait]
impl CredentialStore for KeychainCredentialStore {
    async fn get(&self, key: &str) -> Option<String> {
        let entry = match self.entry(key) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(service = %self.service_name, key, error = %err, "Keychain unavailable");
                return None;
            }
        };

        match entry.get_password() {
            Ok(value) => Some(value),
            Err(keyring::Error::NoEntry) => None,
            Err(keyring::Error::BadEncoding(_)) => {
                debug!(service = %self.service_name, key, "Keychain entry is not valid UTF-8");
                None
            }
            Err(err) => {
                warn!(service = %self.service_name, key, error = %err, "Keychain read failed");
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CredentialStoreError> {
        debug!(service = %self.service_name, key, "Storing credential in keychain");

        self.entry(key)?.set_password(value).map_err(|e| {
            CredentialStoreError::Io(format!("Failed to store keychain entry {key}: {e}"))
        })
    }

    async fn remove(&self, key: &str) -> Result<(), CredentialStoreError> {
        debug!(service = %self.service_name, key, "Deleting credential from keychain");

        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(CredentialStoreError::Io(format!(
                "Failed to delete keychain entry {key}: {e}"
            ))),
        }
    }
}
