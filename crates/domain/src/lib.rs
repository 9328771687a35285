//! # StoreDesk Domain
//!
//! Domain types shared by the StoreDesk client crates.
//!
//! This crate contains:
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Wire types for the backend auth endpoints
//! - Endpoint paths and defaults
//!
//! ## Architecture
//! - No dependencies on other StoreDesk crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
