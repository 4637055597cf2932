//! Error types for twilight-client.

use thiserror::Error;
use twilight_gateway::GatewayError;

/// Errors from the account API and session setup.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP request failed.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid URL.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// Response body did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// Gateway setup failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
