//! Account HTTP API.
//!
//! Thin wrappers over `POST {base}/register` and `POST {base}/login`. Bodies
//! are returned as-is; interpreting them is up to the caller.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use crate::error::ClientError;

/// Environment variable holding the API base URL.
pub const API_URL_ENV: &str = "TWILIGHT_API_URL";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Account API configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL; endpoint paths are appended to it.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ApiConfig {
    /// Parse a base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL does not parse or is not http(s).
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)?;
        match base_url.scheme() {
            "http" | "https" => Ok(Self {
                base_url,
                timeout: DEFAULT_TIMEOUT,
            }),
            other => Err(ClientError::Config(format!(
                "api url must use http or https, got {other}"
            ))),
        }
    }

    /// Read the base URL from `TWILIGHT_API_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is unset or invalid.
    pub fn from_env() -> Result<Self, ClientError> {
        let url = std::env::var(API_URL_ENV)
            .map_err(|_| ClientError::Config(format!("{API_URL_ENV} is not set")))?;
        Self::new(&url)
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL for an endpoint path, appended after any base path.
    ///
    /// # Errors
    ///
    /// Returns an error if the joined URL does not parse.
    pub fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{}", path.trim_start_matches('/')))?)
    }
}

/// Status and raw body of an API response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body text.
    pub body: String,
}

impl ApiResponse {
    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Decode`] if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_str(&self.body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    password: &'a str,
    email: &'a str,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    password: &'a str,
    email: &'a str,
}

/// Client for the account API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, http })
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns an error only if the request could not be completed; non-2xx
    /// statuses come back as an [`ApiResponse`].
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<ApiResponse, ClientError> {
        info!(username, "registering account");
        self.post(
            "register",
            &RegisterRequest {
                username,
                password,
                email,
            },
        )
        .await
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns an error only if the request could not be completed.
    pub async fn login(&self, password: &str, email: &str) -> Result<ApiResponse, ClientError> {
        info!(email, "logging in");
        self.post("login", &LoginRequest { password, email }).await
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<ApiResponse, ClientError> {
        let url = self.config.endpoint(path)?;
        let response = self.http.post(url.clone()).json(body).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(url = %url, status, "api response");
        Ok(ApiResponse { status, body })
    }
}
