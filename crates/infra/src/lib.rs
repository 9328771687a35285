//! # StoreDesk Infrastructure
//!
//! Infrastructure side of the StoreDesk client.
//!
//! This crate contains:
//! - The authenticated API client with single-flight token refresh
//! - Resource endpoint wrappers for the inventory backend
//! - Credential store backends (file, keychain, memory)
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Builds on the credential vault and refresh gate in `storedesk-common`
//! - Depends on `storedesk-domain` for configuration and wire types
//! - Contains all "impure" code (HTTP, filesystem, keychain)

pub mod api;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod http;
pub mod observability;

pub use api::{
    ApiClient, ApiClientBuilder, ApiClientConfig, ApiResponse, ClientError, ClientErrorCategory,
    RequestOptions, StoreApi,
};
pub use credentials::{open_store, FileCredentialStore};
pub use errors::InfraError;
pub use http::HttpClient;
pub use observability::{init_tracing, init_tracing_with_format, LogFormat};
