//! Credential persistence for the bearer-token client
//!
//! The backend issues an access/refresh token pair. This module owns where
//! that pair lives between requests and across restarts.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   TokenVault    │  Only writer of the two credential keys
//! └────────┬────────┘
//!          │
//!          └──► dyn CredentialStore   (durable key-value store)
//!                    │
//!                    ├──► MemoryCredentialStore    (tests, ephemeral sessions)
//!                    ├──► KeychainCredentialStore  (platform keychain)
//!                    └──► FileCredentialStore      (storedesk-infra)
//! ```
//!
//! # Module Organization
//!
//! - **[`types`]**: `CredentialPair`
//! - **[`store`]**: `CredentialStore` trait and its error type
//! - **[`memory`]**: in-memory store
//! - **[`vault`]**: `TokenVault`, the typed facade over a store
//! - **`keychain`**: keychain-backed store (feature `platform`)
//!
//! # Reads never fail
//!
//! A store that is unavailable, or holds a malformed value, reports the key as
//! absent. Callers only ever see "token present" or "token absent".

#[cfg(feature = "platform")]
mod keychain;
pub mod memory;
pub mod store;
pub mod types;
pub mod vault;

#[cfg(feature = "platform")]
pub use keychain::KeychainCredentialStore;
pub use memory::MemoryCredentialStore;
pub use store::{CredentialStore, CredentialStoreError};
pub use types::CredentialPair;
pub use vault::{TokenVault, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
