//! Domain types and models

pub mod auth;

pub use auth::{
    AccessTokenResponse, LoginRequest, RefreshRequest, RegisterRequest, TokenPairResponse,
};
