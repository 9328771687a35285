//! API-specific error types
//!
//! Classifies client failures so callers can tell transport problems from
//! an ended session.

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use storedesk_common::auth::CredentialStoreError;
use thiserror::Error;

/// Categories of client errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientErrorCategory {
    /// Network and timeout failures
    Transport,
    /// Credentials are missing, rejected or expired; a fresh login is needed
    Session,
    /// The backend answered with a non-success status
    Backend,
    /// Encoding, storage, configuration or cancellation on this side
    Local,
}

/// Why a refresh attempt failed
///
/// Shared verbatim with every request queued on the same refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshFailure {
    /// Status returned by the refresh endpoint, if it answered at all
    pub status: Option<u16>,
    pub message: String,
}

impl RefreshFailure {
    pub(crate) fn rejected(status: StatusCode, body: &str) -> Self {
        let message = if body.is_empty() {
            format!("refresh endpoint returned status {status}")
        } else {
            format!("refresh endpoint returned status {status}: {body}")
        };
        Self { status: Some(status.as_u16()), message }
    }

    pub(crate) fn unreachable(err: &ClientError) -> Self {
        Self { status: None, message: err.to_string() }
    }
}

impl fmt::Display for RefreshFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome delivered to requests waiting on a refresh
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    #[error("No refresh token available")]
    NoRefreshToken,

    #[error("Token refresh failed: {0}")]
    Rejected(RefreshFailure),
}

/// API client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("No refresh token available")]
    NoRefreshToken,

    #[error("Token refresh failed: {0}")]
    RefreshFailed(RefreshFailure),

    #[error("Authentication expired; login required")]
    AuthenticationExpired,

    #[error("Backend returned status {status}: {body}")]
    Backend { status: StatusCode, body: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Credential storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl ClientError {
    /// Get the error category for this error
    pub fn category(&self) -> ClientErrorCategory {
        match self {
            Self::Network(_) | Self::Timeout(_) => ClientErrorCategory::Transport,
            Self::NoRefreshToken | Self::RefreshFailed(_) | Self::AuthenticationExpired => {
                ClientErrorCategory::Session
            }
            Self::Backend { .. } => ClientErrorCategory::Backend,
            Self::Decode(_) | Self::Storage(_) | Self::Config(_) | Self::Cancelled => {
                ClientErrorCategory::Local
            }
        }
    }

    /// Whether the caller should treat the user session as ended
    pub fn ends_session(&self) -> bool {
        self.category() == ClientErrorCategory::Session
    }

    /// Backend status code, for [`ClientError::Backend`]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<RefreshError> for ClientError {
    fn from(err: RefreshError) -> Self {
        match err {
            RefreshError::NoRefreshToken => Self::NoRefreshToken,
            RefreshError::Rejected(failure) => Self::RefreshFailed(failure),
        }
    }
}

impl From<CredentialStoreError> for ClientError {
    fn from(err: CredentialStoreError) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(ClientError::Network("down".into()).category(), ClientErrorCategory::Transport);
        assert_eq!(
            ClientError::Timeout(Duration::from_secs(5)).category(),
            ClientErrorCategory::Transport
        );
        assert_eq!(ClientError::AuthenticationExpired.category(), ClientErrorCategory::Session);
        assert_eq!(
            ClientError::Backend { status: StatusCode::BAD_REQUEST, body: String::new() }
                .category(),
            ClientErrorCategory::Backend
        );
        assert_eq!(ClientError::Cancelled.category(), ClientErrorCategory::Local);
    }

    #[test]
    fn test_ends_session() {
        assert!(ClientError::NoRefreshToken.ends_session());
        assert!(ClientError::AuthenticationExpired.ends_session());
        assert!(ClientError::RefreshFailed(RefreshFailure {
            status: Some(401),
            message: "expired".into()
        })
        .ends_session());
        assert!(!ClientError::Network("down".into()).ends_session());
        assert!(!ClientError::Backend {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: String::new()
        }
        .ends_session());
    }

    #[test]
    fn test_refresh_error_conversion() {
        let failure = RefreshFailure::rejected(StatusCode::UNAUTHORIZED, "token_not_valid");
        assert_eq!(failure.status, Some(401));
        assert!(failure.message.contains("token_not_valid"));

        let err: ClientError = RefreshError::Rejected(failure.clone()).into();
        assert!(matches!(err, ClientError::RefreshFailed(f) if f == failure));

        let err: ClientError = RefreshError::NoRefreshToken.into();
        assert!(matches!(err, ClientError::NoRefreshToken));
    }

    #[test]
    fn test_storage_error_conversion() {
        let err: ClientError = CredentialStoreError::Io("read-only filesystem".into()).into();
        assert!(matches!(err, ClientError::Storage(msg) if msg.contains("read-only")));
    }
}
