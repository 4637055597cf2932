//! Error types for the gateway client.

use std::time::Duration;

use thiserror::Error;
use twilight_proto::ProtoError;

/// Errors that can occur while establishing or running a gateway session.
///
/// None of these are returned from [`GatewayClient::connect`](crate::GatewayClient::connect);
/// they reach the application through
/// [`LifecycleEvent`](crate::LifecycleEvent)s.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The transport could not be opened or failed mid-session.
    #[error("transport error: {0}")]
    Transport(String),

    /// The handshake frame could not be delivered.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// The credential provider had no token and one is required.
    #[error("no auth token available")]
    MissingToken,

    /// Opening the transport and identifying took too long.
    #[error("handshake timed out after {0:?}")]
    Timeout(Duration),

    /// Protocol error.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtoError),
}
