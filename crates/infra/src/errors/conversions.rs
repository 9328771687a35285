//! Conversions from transport errors into domain errors.

use reqwest::Error as HttpError;
use storedesk_domain::StoreDeskError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub StoreDeskError);

impl From<InfraError> for StoreDeskError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<StoreDeskError> for InfraError {
    fn from(value: StoreDeskError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoStoreDeskError {
    fn into_storedesk(self) -> StoreDeskError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → StoreDeskError */
/* -------------------------------------------------------------------------- */

impl IntoStoreDeskError for HttpError {
    fn into_storedesk(self) -> StoreDeskError {
        if self.is_timeout() {
            return StoreDeskError::Timeout("HTTP request timed out".into());
        }

        if self.is_connect() {
            return StoreDeskError::Network(format!("HTTP connection failure: {self}"));
        }

        if self.is_builder() {
            return StoreDeskError::Config(format!("invalid HTTP request: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => StoreDeskError::Auth(message),
                404 => StoreDeskError::NotFound(message),
                400..=499 => StoreDeskError::InvalidInput(message),
                _ => StoreDeskError::Network(message),
            };
        }

        StoreDeskError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_storedesk())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
