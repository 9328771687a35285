//! Credential store backed by a JSON file
//!
//! The file holds one flat JSON object of string values. It is re-read on
//! every access so that changes made by another process are visible, and
//! rewritten through a temporary file and a rename so a crash never leaves a
//! half-written file behind.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use storedesk_common::auth::{CredentialStore, CredentialStoreError};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Credential store persisting to a JSON object file
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current file contents; missing or malformed files read as empty
    async fn read_entries(&self) -> BTreeMap<String, Value> {
        let contents = match tokio::fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return BTreeMap::new(),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "Credential file unreadable");
                return BTreeMap::new();
            }
        };

        match serde_json::from_slice::<BTreeMap<String, Value>>(&contents) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "Credential file is malformed; treating as empty"
                );
                BTreeMap::new()
            }
        }
    }

    async fn write_entries(
        &self,
        entries: &BTreeMap<String, Value>,
    ) -> Result<(), CredentialStoreError> {
        let encoded = serde_json::to_vec_pretty(entries)
            .map_err(|e| CredentialStoreError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                CredentialStoreError::Io(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        let staging = self.staging_path();
        tokio::fs::write(&staging, &encoded).await.map_err(|e| {
            CredentialStoreError::Io(format!("Failed to write {}: {e}", staging.display()))
        })?;
        restrict_permissions(&staging).await;

        tokio::fs::rename(&staging, &self.path).await.map_err(|e| {
            CredentialStoreError::Io(format!("Failed to replace {}: {e}", self.path.display()))
        })
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    let permissions = std::fs::Permissions::from_mode(0o600);
    if let Err(err) = tokio::fs::set_permissions(path, permissions).await {
        debug!(path = %path.display(), error = %err, "Could not restrict credential file mode");
    }
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) {}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self, key: &str) -> Option<String> {
        match self.read_entries().await.remove(key) {
            Some(Value::String(value)) => Some(value),
            Some(_) => {
                debug!(key, "Credential entry is not a string; ignoring");
                None
            }
            None => None,
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CredentialStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await;
        entries.insert(key.to_string(), Value::String(value.to_string()));
        self.write_entries(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), CredentialStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.write_entries(&entries).await
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn store_in(dir: &TempDir) -> FileCredentialStore {
        FileCredentialStore::new(dir.path().join("nested").join("credentials.json"))
    }

    #[tokio::test]
    async fn set_get_remove_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.get("access_token").await, None);

        store.set("access_token", "T1").await.unwrap();
        store.set("refresh_token", "R1").await.unwrap();
        assert_eq!(store.get("access_token").await.as_deref(), Some("T1"));

        store.remove("access_token").await.unwrap();
        store.remove("access_token").await.unwrap();
        assert_eq!(store.get("access_token").await, None);
        assert_eq!(store.get("refresh_token").await.as_deref(), Some("R1"));
    }

    #[tokio::test]
    async fn survives_reopen() {
        let dir = TempDir::new().unwrap();
        store_in(&dir).set("refresh_token", "R1").await.unwrap();

        let reopened = store_in(&dir);
        assert_eq!(reopened.get("refresh_token").await.as_deref(), Some("R1"));
        assert!(!reopened.staging_path().exists());
    }

    #[tokio::test]
    async fn malformed_file_reads_as_empty_and_is_replaced() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), b"{ not json").unwrap();

        assert_eq!(store.get("access_token").await, None);

        store.set("access_token", "T2").await.unwrap();
        assert_eq!(store.get("access_token").await.as_deref(), Some("T2"));
    }

    #[tokio::test]
    async fn non_string_value_reads_as_absent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), br#"{"access_token": 42, "refresh_token": "R1"}"#).unwrap();

        assert_eq!(store.get("access_token").await, None);
        assert_eq!(store.get("refresh_token").await.as_deref(), Some("R1"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn file_is_private_to_owner() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set("access_token", "T1").await.unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
