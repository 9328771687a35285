//! Durable key-value store abstraction for credentials
//!
//! This trait enables dependency injection and testing by abstracting the
//! backing storage (memory, file, platform keychain).

use async_trait::async_trait;
use thiserror::Error;

/// Error type for credential store writes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialStoreError {
    /// The backing store could not be reached
    #[error("Credential store unavailable: {0}")]
    Unavailable(String),

    /// Reading or writing the backing medium failed
    #[error("Credential store I/O failed: {0}")]
    Io(String),

    /// The stored document could not be encoded
    #[error("Credential store serialization failed: {0}")]
    Serialization(String),
}

/// String key-value store that survives process restarts
///
/// Implementations must be cheap to call from async code; none of the
/// operations are expected to block for long.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read a value
    ///
    /// Returns `None` when the key is absent, the store is unavailable, or the
    /// stored value is malformed.
    async fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one
    ///
    /// # Errors
    /// Returns error if the value could not be persisted
    async fn set(&self, key: &str, value: &str) -> Result<(), CredentialStoreError>;

    /// Remove a value (idempotent)
    ///
    /// # Errors
    /// Returns error if the backing store rejected the deletion
    async fn remove(&self, key: &str) -> Result<(), CredentialStoreError>;
}
