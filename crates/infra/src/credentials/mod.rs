//! Credential store backends selected from configuration

mod file;

use std::path::PathBuf;
use std::sync::Arc;

use storedesk_common::auth::{CredentialStore, KeychainCredentialStore, MemoryCredentialStore};
use storedesk_domain::{CredentialBackend, CredentialConfig, Result, StoreDeskError};
use tracing::info;

pub use file::FileCredentialStore;

use crate::config::default_credential_path;

/// Open the credential store named by `config`
///
/// # Errors
/// Returns `StoreDeskError::Config` if the file backend is given a blank
/// path.
pub fn open_store(config: &CredentialConfig) -> Result<Arc<dyn CredentialStore>> {
    let store: Arc<dyn CredentialStore> = match config.backend {
        CredentialBackend::Memory => Arc::new(MemoryCredentialStore::new()),
        CredentialBackend::File => {
            let path = match config.path.as_deref().map(str::trim) {
                Some("") => {
                    return Err(StoreDeskError::Config("Credential file path is empty".into()))
                }
                Some(path) => PathBuf::from(path),
                None => default_credential_path(),
            };
            info!(path = %path.display(), "Using file credential store");
            Arc::new(FileCredentialStore::new(path))
        }
        CredentialBackend::Keychain => {
            info!(service = %config.service_name, "Using keychain credential store");
            Arc::new(KeychainCredentialStore::new(config.service_name.clone()))
        }
    };

    Ok(store)
}
