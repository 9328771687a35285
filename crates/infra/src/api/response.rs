//! Fully-read backend responses

use reqwest::header::HeaderMap;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use storedesk_domain::StoreDeskError;

use super::errors::ClientError;
use crate::errors::InfraError;

/// Backend response with its body already read
///
/// Returned verbatim by [`ApiClient::request`](super::ApiClient::request)
/// for every status except a 401 the client handled itself.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self { status, headers, body }
    }

    pub(crate) async fn read(response: Response) -> Result<Self, StoreDeskError> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|err| {
            let infra: InfraError = err.into();
            StoreDeskError::from(infra)
        })?;

        Ok(Self { status, headers, body: body.to_vec() })
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Body as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub(crate) fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }

    /// Decode the body as JSON
    ///
    /// 204/205 responses and empty bodies decode from `null`, so `()` and
    /// `Option<T>` work for endpoints without content.
    ///
    /// # Errors
    /// Returns [`ClientError::Decode`] if the body does not match `T`
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        let no_content = self.status == StatusCode::NO_CONTENT
            || self.status == StatusCode::RESET_CONTENT
            || self.body.is_empty();

        if no_content {
            return serde_json::from_value(serde_json::Value::Null).map_err(|_| {
                ClientError::Decode(format!(
                    "No content response ({}) cannot be decoded into the response type",
                    self.status.as_u16()
                ))
            });
        }

        serde_json::from_slice(&self.body)
            .map_err(|e| ClientError::Decode(format!("Failed to parse response: {e}")))
    }

    /// Turn a non-2xx response into [`ClientError::Backend`]
    ///
    /// # Errors
    /// Returns [`ClientError::Backend`] carrying the status and body text
    pub fn error_for_status(self) -> Result<Self, ClientError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ClientError::Backend { status: self.status, body: self.text() })
        }
    }
}
