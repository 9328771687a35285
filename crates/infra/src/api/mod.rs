//! Authenticated client for the StoreDesk backend
//!
//! # Architecture
//!
//! - [`ApiClient`] sends every request with the stored bearer token and
//!   recovers from an expired access token with a single shared refresh
//! - Session operations (login, register, logout) live in `auth`
//! - [`StoreApi`] wraps the resource endpoints
//! - Uses the infra [`HttpClient`](crate::http::HttpClient); nothing is
//!   retried except the one post-refresh resend

mod auth;
pub mod client;
pub mod endpoints;
pub mod errors;
pub mod request;
pub mod response;

pub use client::{ApiClient, ApiClientBuilder, ApiClientConfig};
pub use endpoints::StoreApi;
pub use errors::{ClientError, ClientErrorCategory, RefreshError, RefreshFailure};
pub use request::{Attempt, RequestOptions};
pub use response::ApiResponse;
