//! Request descriptions threaded through the refresh pipeline

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;

use super::errors::ClientError;

/// Which send of a logical request this is
///
/// A request is sent at most twice: once as issued, and once more after a
/// token refresh. The value is immutable; [`Attempt::retry`] yields the next
/// one, or `None` when the request has already been retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    number: u8,
}

impl Attempt {
    pub const fn first() -> Self {
        Self { number: 0 }
    }

    pub const fn number(self) -> u8 {
        self.number
    }

    pub const fn is_retry(self) -> bool {
        self.number > 0
    }

    pub const fn retry(self) -> Option<Self> {
        if self.number == 0 {
            Some(Self { number: 1 })
        } else {
            None
        }
    }
}

/// Per-request options
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub query: Vec<(String, String)>,
    /// Extra headers; `Authorization` and `Content-Type` are set by the
    /// client and dropped from here
    pub headers: HeaderMap,
    /// Overrides the client-wide timeout
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// A request with its body already encoded, so it can be sent again as is
#[derive(Debug, Clone)]
pub(crate) struct PreparedRequest {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) body: Option<Vec<u8>>,
    pub(crate) options: RequestOptions,
}

impl PreparedRequest {
    pub(crate) fn new<B>(
        method: Method,
        url: String,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<Self, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let body = body
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| ClientError::Decode(format!("Failed to serialize body: {e}")))?;

        Ok(Self { method, url, body, options })
    }
}
