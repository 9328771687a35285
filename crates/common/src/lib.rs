//! Modular common utilities shared across StoreDesk crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `runtime`: credential pair, credential store trait, token vault,
//!   in-memory store, single-flight gate
//! - `platform`: OS keychain credential store

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod auth;
#[cfg(feature = "runtime")]
pub mod sync;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use auth::{
    CredentialPair, CredentialStore, CredentialStoreError, MemoryCredentialStore, TokenVault,
};
#[cfg(feature = "platform")]
pub use auth::KeychainCredentialStore;
#[cfg(feature = "runtime")]
pub use sync::{Flight, FlightAbandoned, FlightGuard, FlightWaiter, SingleFlight};
