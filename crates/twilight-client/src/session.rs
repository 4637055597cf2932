//! Explicit application context.
//!
//! A [`Session`] bundles everything one signed-in user needs: the account
//! API, the user store, the token, and a gateway client that reads its token
//! from the same cell. Sessions are independent; several may coexist.

use std::sync::Arc;

use tracing::info;
use twilight_gateway::{GatewayClient, GatewayConfig, TokenCell};

use crate::api::{ApiClient, ApiConfig, ApiResponse};
use crate::error::ClientError;
use crate::store::UserStore;

/// Per-user context owning the API client, user store, token and gateway.
#[derive(Debug)]
pub struct Session {
    api: ApiClient,
    user: UserStore,
    token: TokenCell,
    gateway: GatewayClient,
}

impl Session {
    /// Build a session.
    ///
    /// # Errors
    ///
    /// Returns an error if either configuration is invalid.
    pub fn new(api: ApiConfig, gateway: GatewayConfig) -> Result<Self, ClientError> {
        let token = TokenCell::new();
        let gateway = GatewayClient::new(gateway, Arc::new(token.clone()))?;
        Ok(Self {
            api: ApiClient::new(api)?,
            user: UserStore::new(),
            token,
            gateway,
        })
    }

    /// Build a session from `TWILIGHT_API_URL` and `TWILIGHT_GATEWAY_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if either variable is unset or invalid.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ApiConfig::from_env()?, GatewayConfig::from_env()?)
    }

    /// Account API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Signed-in user's profile.
    #[must_use]
    pub fn user(&self) -> &UserStore {
        &self.user
    }

    /// Token used for the gateway handshake.
    #[must_use]
    pub fn token(&self) -> &TokenCell {
        &self.token
    }

    /// Gateway client.
    #[must_use]
    pub fn gateway(&self) -> &GatewayClient {
        &self.gateway
    }

    /// Store a token; the next gateway connection identifies with it.
    pub fn set_token(&self, token: impl Into<String>) {
        self.token.set(token);
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::register`].
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<ApiResponse, ClientError> {
        self.api.register(username, password, email).await
    }

    /// Log in. The response is returned untouched; call
    /// [`set_token`](Self::set_token) with whatever token it carries.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::login`].
    pub async fn login(&self, password: &str, email: &str) -> Result<ApiResponse, ClientError> {
        self.api.login(password, email).await
    }

    /// Start the gateway connection.
    pub fn connect(&self) {
        self.gateway.connect();
    }

    /// Stop the gateway and forget the token and profile.
    pub async fn logout(&self) {
        self.gateway.shutdown().await;
        self.token.clear();
        self.user.clear();
        info!("session cleared");
    }
}
