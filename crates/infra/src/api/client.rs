//! Authenticated API client with single-flight token refresh
//!
//! Every request carries the stored access token. A 401 triggers at most one
//! refresh per original call; concurrent 401s queue behind a single refresh
//! and are retried with its result.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use storedesk_common::auth::{CredentialPair, CredentialStore, MemoryCredentialStore, TokenVault};
use storedesk_common::sync::{Flight, FlightGuard, SingleFlight};
use storedesk_domain::constants::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS, REGISTER_PATH, TOKEN_PATH, TOKEN_REFRESH_PATH,
};
use storedesk_domain::{ApiConfig, Config, StoreDeskError};
use tracing::{debug, info, instrument, warn};

use super::errors::{ClientError, RefreshError};
use super::request::{Attempt, PreparedRequest, RequestOptions};
use super::response::ApiResponse;
use crate::http::HttpClient;

/// Configuration for API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL for API (e.g., "http://127.0.0.1:8000/api")
    pub base_url: String,
    /// Default timeout for each send, including reading the body
    pub timeout: Duration,
    pub user_agent: String,
    /// Token-issue endpoint used by login
    pub token_path: String,
    pub refresh_path: String,
    pub register_path: String,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            user_agent: default_user_agent(),
            token_path: TOKEN_PATH.to_string(),
            refresh_path: TOKEN_REFRESH_PATH.to_string(),
            register_path: REGISTER_PATH.to_string(),
        }
    }
}

impl From<&ApiConfig> for ApiClientConfig {
    fn from(api: &ApiConfig) -> Self {
        Self {
            base_url: api.base_url.clone(),
            timeout: api.timeout(),
            user_agent: api.user_agent.clone().unwrap_or_else(default_user_agent),
            ..Self::default()
        }
    }
}

fn default_user_agent() -> String {
    format!("storedesk/{}", env!("CARGO_PKG_VERSION"))
}

/// API client with transparent access-token refresh
///
/// Owns the token vault and the refresh gate; share it with `Arc` so every
/// caller goes through the same gate.
pub struct ApiClient {
    pub(super) http: HttpClient,
    pub(super) config: ApiClientConfig,
    pub(super) vault: TokenVault,
    refresh: SingleFlight<String, RefreshError>,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Arguments
    ///
    /// * `config` - Client configuration
    /// * `store` - Durable store holding the token pair
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the base URL is invalid or the
    /// HTTP client cannot be built
    pub fn new(
        config: ApiClientConfig,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, ClientError> {
        reqwest::Url::parse(&config.base_url).map_err(|e| {
            ClientError::Config(format!("Invalid base URL {}: {e}", config.base_url))
        })?;

        let http = HttpClient::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HttpClient: {e}")))?;

        Ok(Self { http, config, vault: TokenVault::new(store), refresh: SingleFlight::new() })
    }

    /// Build a client from loaded configuration, opening the configured
    /// credential store
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Config`] if the store or client cannot be set up
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let store = crate::credentials::open_store(&config.credentials)
            .map_err(|e| ClientError::Config(e.to_string()))?;
        Self::new(ApiClientConfig::from(&config.api), store)
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    pub fn vault(&self) -> &TokenVault {
        &self.vault
    }

    /// Whether a token refresh is currently outstanding
    pub fn refresh_in_progress(&self) -> bool {
        self.refresh.in_progress()
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    /// Send one authenticated request
    ///
    /// Any response other than a handled 401 is returned as is, including
    /// 4xx and 5xx.
    ///
    /// # Errors
    ///
    /// Transport failures, or a session that cannot be recovered
    /// ([`ClientError::ends_session`])
    #[instrument(skip(self, body, options), fields(method = %method, path = %path))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        options: &RequestOptions,
    ) -> Result<ApiResponse, ClientError> {
        let request = PreparedRequest::new(method, self.url(path), body, options.clone())?;
        self.dispatch(&request).await
    }

    /// Execute a GET request and decode the JSON response
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Backend`] for non-2xx responses, or any error of
    /// [`ApiClient::request`]
    #[instrument(skip(self), fields(path = %path))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.json_call::<(), T>(Method::GET, path, None).await
    }

    /// Execute a POST request with a JSON body
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::get`]
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.json_call(Method::POST, path, Some(body)).await
    }

    /// Execute a PUT request with a JSON body
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::get`]
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.json_call(Method::PUT, path, Some(body)).await
    }

    /// Execute a DELETE request, ignoring any response body
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::get`]
    #[instrument(skip(self), fields(path = %path))]
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let options = RequestOptions::default();
        let request = PreparedRequest::new::<()>(Method::DELETE, self.url(path), None, options)?;
        self.dispatch(&request).await?.error_for_status()?;
        Ok(())
    }

    /// Execute a GET request and return the raw body
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::get`]
    #[instrument(skip(self, options), fields(path = %path))]
    pub async fn get_bytes(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<Vec<u8>, ClientError> {
        let request =
            PreparedRequest::new::<()>(Method::GET, self.url(path), None, options.clone())?;
        let response = self.dispatch(&request).await?.error_for_status()?;
        Ok(response.into_body())
    }

    async fn json_call<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let options = RequestOptions::default();
        let request = PreparedRequest::new(method, self.url(path), body, options)?;
        let response = self.dispatch(&request).await?.error_for_status()?;
        response.json()
    }

    /// Send loop: one send, and one more after a refresh
    async fn dispatch(&self, request: &PreparedRequest) -> Result<ApiResponse, ClientError> {
        let mut attempt = Attempt::first();
        let mut token = self.vault.access_token().await;

        loop {
            let response = self.send(request, token.as_deref(), attempt).await?;
            if !response.is_unauthorized() {
                return Ok(response);
            }

            let Some(next) = attempt.retry() else {
                warn!("Request rejected again after token refresh");
                return Err(ClientError::AuthenticationExpired);
            };

            token = Some(self.recover(token.as_deref()).await?);
            attempt = next;
        }
    }

    /// Obtain a usable access token after a 401 sent with `stale`
    async fn recover(&self, stale: Option<&str>) -> Result<String, ClientError> {
        match self.refresh.join() {
            Flight::Follower(waiter) => {
                debug!("Token refresh in progress; waiting for its outcome");
                match waiter.wait().await {
                    Ok(outcome) => outcome.map_err(ClientError::from),
                    Err(_) => Err(ClientError::Cancelled),
                }
            }
            Flight::Leader(guard) => self.lead_refresh(guard, stale).await,
        }
    }

    async fn lead_refresh(
        &self,
        guard: FlightGuard<'_, String, RefreshError>,
        stale: Option<&str>,
    ) -> Result<String, ClientError> {
        if let Some(current) = self.vault.access_token().await {
            if stale != Some(current.as_str()) {
                debug!("Access token already rotated; retrying with the stored token");
                guard.settle(Ok(current.clone()));
                return Ok(current);
            }
        }

        let Some(refresh_token) = self.vault.refresh_token().await else {
            warn!("Authorization failed and no refresh token is stored");
            guard.settle(Err(RefreshError::NoRefreshToken));
            return Err(ClientError::NoRefreshToken);
        };

        match self.request_refresh(&refresh_token).await {
            Ok(tokens) => {
                let stored = match &tokens.refresh {
                    Some(rotated) => {
                        let pair = CredentialPair::new(tokens.access.clone(), rotated.clone());
                        self.vault.store_pair(&pair).await
                    }
                    None => self.vault.store_access(&tokens.access).await,
                };
                if let Err(err) = stored {
                    warn!(error = %err, "Failed to persist refreshed access token");
                }

                let waiters = guard.settle(Ok(tokens.access.clone()));
                info!(waiters, "Access token refreshed");
                Ok(tokens.access)
            }
            Err(failure) => {
                self.vault.clear().await;
                let waiters = guard.settle(Err(RefreshError::Rejected(failure.clone())));
                warn!(
                    waiters,
                    status = ?failure.status,
                    "Token refresh failed; credentials cleared"
                );
                Err(ClientError::RefreshFailed(failure))
            }
        }
    }

    /// Send once, with `token` as bearer if present
    pub(super) async fn send(
        &self,
        request: &PreparedRequest,
        token: Option<&str>,
        attempt: Attempt,
    ) -> Result<ApiResponse, ClientError> {
        let timeout = request.options.timeout.unwrap_or(self.config.timeout);

        // Authorization and Content-Type are owned by the client.
        let mut headers = request.options.headers.clone();
        headers.remove(AUTHORIZATION);
        headers.remove(CONTENT_TYPE);

        let mut builder = self
            .http
            .request(request.method.clone(), &request.url)
            .timeout(timeout)
            .headers(headers);

        if !request.options.query.is_empty() {
            builder = builder.query(&request.options.query);
        }
        if let Some(body) = &request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body.clone());
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        debug!(
            attempt = attempt.number(),
            retry = attempt.is_retry(),
            authenticated = token.is_some(),
            "Sending request"
        );

        let exchange = async {
            let response = self.http.send(builder).await?;
            ApiResponse::read(response).await
        };

        match tokio::time::timeout(timeout, exchange).await {
            Ok(Ok(response)) => {
                debug!(status = %response.status(), "Received response");
                Ok(response)
            }
            Ok(Err(err)) => Err(Self::map_storedesk_error(err, timeout)),
            Err(_) => Err(ClientError::Timeout(timeout)),
        }
    }

    fn map_storedesk_error(err: StoreDeskError, timeout: Duration) -> ClientError {
        match err {
            StoreDeskError::Timeout(_) => ClientError::Timeout(timeout),
            StoreDeskError::Config(message) => ClientError::Config(message),
            StoreDeskError::InvalidInput(message) => ClientError::Decode(message),
            StoreDeskError::Storage(message) => ClientError::Storage(message),
            StoreDeskError::Network(message)
            | StoreDeskError::Auth(message)
            | StoreDeskError::NotFound(message) => ClientError::Network(message),
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("refresh", &self.refresh)
            .finish_non_exhaustive()
    }
}

/// Builder for API client
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ApiClientConfig>,
    store: Option<Arc<dyn CredentialStore>>,
}

impl ApiClientBuilder {
    /// Set the API configuration
    pub fn config(mut self, config: ApiClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.get_or_insert_with(ApiClientConfig::default).base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.get_or_insert_with(ApiClientConfig::default).timeout = timeout;
        self
    }

    /// Set the credential store; defaults to an in-memory store
    pub fn store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    ///
    /// Returns error if client creation fails
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let config = self.config.unwrap_or_default();
        let store = self.store.unwrap_or_else(|| Arc::new(MemoryCredentialStore::new()));

        ApiClient::new(config, store)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use storedesk_domain::constants::PRODUCTS_PATH;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer, store: Arc<MemoryCredentialStore>) -> ApiClient {
        ApiClient::builder().base_url(server.uri()).store(store).build().unwrap()
    }

    #[test]
    fn test_url_joining() {
        let client = ApiClient::builder().base_url("http://localhost:8000/api/").build().unwrap();

        assert_eq!(client.url("/products/"), "http://localhost:8000/api/products/");
        assert_eq!(client.url("products/"), "http://localhost:8000/api/products/");
    }

    #[test]
    fn test_builder_rejects_invalid_base_url() {
        let err = ApiClient::builder().base_url("not a url").build().unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_config_from_api_config() {
        let api = ApiConfig {
            base_url: "https://store.example.com/api".into(),
            timeout_ms: 1500,
            user_agent: None,
        };
        let config = ApiClientConfig::from(&api);

        assert_eq!(config.base_url, "https://store.example.com/api");
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert!(config.user_agent.starts_with("storedesk/"));
        assert_eq!(config.refresh_path, TOKEN_REFRESH_PATH);
    }

    #[tokio::test]
    async fn test_from_config_with_memory_backend() {
        let mut config = Config::default();
        config.credentials.backend = storedesk_domain::CredentialBackend::Memory;
        config.api.timeout_ms = 1200;

        let client = ApiClient::from_config(&config).unwrap();

        assert_eq!(client.config().timeout, Duration::from_millis(1200));
        assert!(!client.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_get_with_json_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/"))
            .and(header("Authorization", "Bearer T1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemoryCredentialStore::with_tokens("T1", "R1")));
        let products: serde_json::Value = client.get(PRODUCTS_PATH).await.unwrap();

        assert_eq!(products, json!([{"id": 1}]));
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/products/"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({"name": "Ibuprofen"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemoryCredentialStore::with_tokens("T1", "R1")));
        let created: serde_json::Value =
            client.post(PRODUCTS_PATH, &json!({"name": "Ibuprofen"})).await.unwrap();

        assert_eq!(created["id"], 7);
    }

    #[tokio::test]
    async fn test_delete_with_204_no_content() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/products/3/"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemoryCredentialStore::with_tokens("T1", "R1")));
        client.delete("/products/3/").await.unwrap();
    }

    #[tokio::test]
    async fn test_request_passes_error_status_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemoryCredentialStore::with_tokens("T1", "R1")));
        let response = client
            .request(Method::GET, "/products/99/", None, &RequestOptions::default())
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
        assert_eq!(response.text(), "missing");
    }

    #[tokio::test]
    async fn test_typed_helper_maps_backend_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemoryCredentialStore::new()));
        let err = client.get::<serde_json::Value>("/dashboard/stats/").await.unwrap_err();

        assert_eq!(err.status(), Some(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!err.ends_session());
    }

    #[tokio::test]
    async fn test_per_request_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemoryCredentialStore::new()));
        let options = RequestOptions::new().timeout(Duration::from_millis(50));
        let err = client.request(Method::GET, "/products/", None, &options).await.unwrap_err();

        assert!(matches!(err, ClientError::Timeout(t) if t == Duration::from_millis(50)));
        assert!(!client.refresh_in_progress());
    }

    #[tokio::test]
    async fn test_query_and_extra_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/history/sales/"))
            .and(wiremock::matchers::query_param("page", "2"))
            .and(header("X-Request-Source", "desk"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemoryCredentialStore::with_tokens("T1", "R1")));
        let options = RequestOptions::new().query("page", "2").header(
            reqwest::header::HeaderName::from_static("x-request-source"),
            reqwest::header::HeaderValue::from_static("desk"),
        );
        let response =
            client.request(Method::GET, "/history/sales/", None, &options).await.unwrap();

        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_reserved_headers_are_not_duplicated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/purchases/"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(MemoryCredentialStore::with_tokens("T1", "R1")));
        let options = RequestOptions::new()
            .header(AUTHORIZATION, reqwest::header::HeaderValue::from_static("Bearer forged"))
            .header(CONTENT_TYPE, reqwest::header::HeaderValue::from_static("text/plain"));
        let body = json!({"product": 1, "quantity": 3});
        client.request(Method::POST, "/purchases/", Some(&body), &options).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let sent = &requests[0].headers;
        let authorization: Vec<_> = sent.get_all("authorization").iter().collect();
        let content_type: Vec<_> = sent.get_all("content-type").iter().collect();
        assert_eq!(authorization, ["Bearer T1"]);
        assert_eq!(content_type, ["application/json"]);
    }

    #[test]
    fn test_transport_errors_map_by_category() {
        let timeout = Duration::from_millis(250);
        let map = |err| ApiClient::map_storedesk_error(err, timeout);

        assert!(matches!(
            map(StoreDeskError::Timeout("slow".into())),
            ClientError::Timeout(t) if t == timeout
        ));
        assert!(matches!(map(StoreDeskError::Config("url".into())), ClientError::Config(_)));
        assert!(matches!(map(StoreDeskError::InvalidInput("json".into())), ClientError::Decode(_)));
        assert!(matches!(map(StoreDeskError::NotFound("dns".into())), ClientError::Network(_)));
    }
}
