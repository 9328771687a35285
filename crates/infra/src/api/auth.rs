//! Session operations on [`ApiClient`]
//!
//! Login, registration and token refresh talk to the backend without a
//! bearer token and never go through the refresh pipeline themselves.

use reqwest::Method;
use serde::Serialize;
use storedesk_common::auth::CredentialPair;
use storedesk_domain::{
    AccessTokenResponse, LoginRequest, RefreshRequest, RegisterRequest, TokenPairResponse,
};
use tracing::{info, instrument};

use super::client::ApiClient;
use super::errors::{ClientError, RefreshFailure};
use super::request::{Attempt, PreparedRequest, RequestOptions};
use super::response::ApiResponse;

impl ApiClient {
    /// Exchange credentials for a token pair and store it
    ///
    /// # Errors
    ///
    /// [`ClientError::Backend`] if the backend rejects the credentials; the
    /// store is left untouched. [`ClientError::Storage`] if the pair cannot
    /// be written.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<CredentialPair, ClientError> {
        let body = LoginRequest { username: username.to_string(), password: password.to_string() };
        let response = self.send_unauthenticated(&self.config.token_path, &body).await?;
        let tokens: TokenPairResponse = response.error_for_status()?.json()?;

        let pair = CredentialPair::new(tokens.access, tokens.refresh);
        self.vault.store_pair(&pair).await?;

        info!("Login successful");
        Ok(pair)
    }

    /// Create an account, then log in with it
    ///
    /// # Errors
    ///
    /// [`ClientError::Backend`] with the backend's validation errors, or any
    /// error of [`ApiClient::login`]
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<CredentialPair, ClientError> {
        let body = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        self.send_unauthenticated(&self.config.register_path, &body).await?.error_for_status()?;

        info!("Registration accepted");
        self.login(username, password).await
    }

    /// Forget both tokens
    pub async fn logout(&self) {
        self.vault.clear().await;
        info!("Logged out");
    }

    pub async fn is_authenticated(&self) -> bool {
        self.vault.is_authenticated().await
    }

    /// Stored token pair, when both tokens are present
    pub async fn credentials(&self) -> Option<CredentialPair> {
        self.vault.credentials().await
    }

    /// Call the refresh endpoint
    ///
    /// Any non-2xx answer, undecodable body or transport failure is a
    /// [`RefreshFailure`].
    pub(super) async fn request_refresh(
        &self,
        refresh_token: &str,
    ) -> Result<AccessTokenResponse, RefreshFailure> {
        let body = RefreshRequest { refresh: refresh_token.to_string() };
        let response = self
            .send_unauthenticated(&self.config.refresh_path, &body)
            .await
            .map_err(|err| RefreshFailure::unreachable(&err))?;

        if !response.is_success() {
            return Err(RefreshFailure::rejected(response.status(), &response.text()));
        }

        response.json().map_err(|err| RefreshFailure {
            status: Some(response.status().as_u16()),
            message: err.to_string(),
        })
    }

    async fn send_unauthenticated<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, ClientError> {
        let options = RequestOptions::default();
        let request = PreparedRequest::new(Method::POST, self.url(path), Some(body), options)?;
        self.send(&request, None, Attempt::first()).await
    }
}
