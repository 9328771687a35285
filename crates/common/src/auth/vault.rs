//! Typed access to the stored credential pair
//!
//! `TokenVault` is the single writer of the `access_token` and
//! `refresh_token` keys. Login writes both, refresh overwrites the access
//! token, logout and failed refreshes remove both.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::store::{CredentialStore, CredentialStoreError};
use super::types::CredentialPair;

/// Storage key for the bearer token
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Storage key for the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Facade over a [`CredentialStore`] holding the credential pair
#[derive(Clone)]
pub struct TokenVault {
    store: Arc<dyn CredentialStore>,
}

impl TokenVault {
    #[must_use]
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Current access token, if one is stored
    pub async fn access_token(&self) -> Option<String> {
        self.read(ACCESS_TOKEN_KEY).await
    }

    /// Current refresh token, if one is stored
    pub async fn refresh_token(&self) -> Option<String> {
        self.read(REFRESH_TOKEN_KEY).await
    }

    /// Both tokens, when both are stored
    pub async fn credentials(&self) -> Option<CredentialPair> {
        let access_token = self.access_token().await?;
        let refresh_token = self.refresh_token().await?;
        Some(CredentialPair { access_token, refresh_token })
    }

    /// Whether an access token is stored
    pub async fn is_authenticated(&self) -> bool {
        self.access_token().await.is_some()
    }

    /// Persist a freshly issued pair
    ///
    /// If the refresh token cannot be written the previous access token is
    /// put back (or removed when there was none), so the stored keys always
    /// belong to the same pair.
    ///
    /// # Errors
    /// Returns error if either write fails
    pub async fn store_pair(&self, pair: &CredentialPair) -> Result<(), CredentialStoreError> {
        let previous_access = self.store.get(ACCESS_TOKEN_KEY).await;
        self.store.set(ACCESS_TOKEN_KEY, &pair.access_token).await?;

        if let Err(err) = self.store.set(REFRESH_TOKEN_KEY, &pair.refresh_token).await {
            let rollback = match previous_access.as_deref() {
                Some(previous) => self.store.set(ACCESS_TOKEN_KEY, previous).await,
                None => self.store.remove(ACCESS_TOKEN_KEY).await,
            };
            if let Err(cleanup) = rollback {
                warn!(error = %cleanup, "Failed to roll back access token after partial write");
            }
            return Err(err);
        }

        info!("Credential pair stored");
        Ok(())
    }

    /// Overwrite the access token after a refresh
    ///
    /// # Errors
    /// Returns error if the write fails
    pub async fn store_access(&self, access_token: &str) -> Result<(), CredentialStoreError> {
        self.store.set(ACCESS_TOKEN_KEY, access_token).await?;
        debug!("Access token replaced");
        Ok(())
    }

    /// Remove both tokens
    ///
    /// Never fails; store errors are logged and the remaining key is still
    /// attempted.
    pub async fn clear(&self) {
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(err) = self.store.remove(key).await {
                warn!(key, error = %err, "Failed to remove credential");
            }
        }
        info!("Credentials cleared");
    }

    async fn read(&self, key: &str) -> Option<String> {
        // Blank values are treated as corrupted entries.
        self.store.get(key).await.filter(|value| !value.trim().is_empty())
    }
}

impl fmt::Debug for TokenVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVault").finish_non_exhaustive()
    }
}
