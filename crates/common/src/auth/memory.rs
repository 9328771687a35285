//! In-memory credential store

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::store::{CredentialStore, CredentialStoreError};

/// Credential store that lives for the process lifetime only
///
/// Used as the test fake and for sessions that must not touch disk.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with both credential keys
    #[must_use]
    pub fn with_tokens(access_token: &str, refresh_token: &str) -> Self {
        let store = Self::new();
        {
            let mut entries = store.entries.lock();
            entries.insert(super::ACCESS_TOKEN_KEY.to_string(), access_token.to_string());
            entries.insert(super::REFRESH_TOKEN_KEY.to_string(), refresh_token.to_string());
        }
        store
    }

    /// Number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CredentialStoreError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CredentialStoreError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove() {
        let store = MemoryCredentialStore::new();
        assert!(store.get("access_token").await.is_none());

        store.set("access_token", "T1").await.unwrap();
        assert_eq!(store.get("access_token").await.as_deref(), Some("T1"));

        store.set("access_token", "T2").await.unwrap();
        assert_eq!(store.get("access_token").await.as_deref(), Some("T2"));

        store.remove("access_token").await.unwrap();
        store.remove("access_token").await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn with_tokens_seeds_both_keys() {
        let store = MemoryCredentialStore::with_tokens("T1", "R1");
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("refresh_token").await.as_deref(), Some("R1"));
    }
}
