//! Gateway client configuration.

use std::time::Duration;

use crate::error::GatewayError;
use crate::reconnect::ReconnectConfig;

/// Environment variable holding the gateway URL.
pub const GATEWAY_URL_ENV: &str = "TWILIGHT_GATEWAY_URL";

/// What to do with an inbound frame that fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeFailurePolicy {
    /// Log and drop the frame; the session continues.
    #[default]
    Drop,
    /// Treat the frame as a protocol violation and reconnect.
    Reconnect,
}

/// Configuration for a [`GatewayClient`](crate::GatewayClient).
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Gateway WebSocket URL.
    pub url: String,
    /// Reconnection policy.
    pub reconnect: ReconnectConfig,
    /// Abort the attempt instead of identifying without a token.
    pub require_token: bool,
    /// Handling of malformed inbound frames.
    pub decode_failure: DecodeFailurePolicy,
    /// Upper bound on open + token fetch + handshake send. `None` waits forever.
    pub handshake_timeout: Option<Duration>,
    /// Capacity of the receive-to-dispatch queue.
    pub frame_buffer: usize,
    /// Capacity of the lifecycle broadcast channel.
    pub lifecycle_buffer: usize,
}

impl GatewayConfig {
    /// Create a configuration with default policies for `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect: ReconnectConfig::default(),
            require_token: true,
            decode_failure: DecodeFailurePolicy::default(),
            handshake_timeout: None,
            frame_buffer: 256,
            lifecycle_buffer: 64,
        }
    }

    /// Read the gateway URL from `TWILIGHT_GATEWAY_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is unset or the URL is invalid.
    pub fn from_env() -> Result<Self, GatewayError> {
        let url = std::env::var(GATEWAY_URL_ENV)
            .map_err(|_| GatewayError::Config(format!("{GATEWAY_URL_ENV} is not set")))?;
        let config = Self::new(url);
        config.validate()?;
        Ok(config)
    }

    /// Set the reconnection policy.
    #[must_use]
    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Choose whether a missing token aborts the attempt.
    #[must_use]
    pub fn with_require_token(mut self, require: bool) -> Self {
        self.require_token = require;
        self
    }

    /// Set the decode failure policy.
    #[must_use]
    pub fn with_decode_failure(mut self, policy: DecodeFailurePolicy) -> Self {
        self.decode_failure = policy;
        self
    }

    /// Bound the time spent opening and identifying.
    #[must_use]
    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = Some(timeout);
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.url.is_empty() {
            return Err(GatewayError::Config("gateway url cannot be empty".to_string()));
        }

        if !self.url.starts_with("ws://") && !self.url.starts_with("wss://") {
            return Err(GatewayError::Config(format!(
                "invalid gateway url: {}, must start with ws:// or wss://",
                self.url
            )));
        }

        if self.frame_buffer == 0 || self.lifecycle_buffer == 0 {
            return Err(GatewayError::Config(
                "channel buffers must be non-zero".to_string(),
            ));
        }

        if self.handshake_timeout == Some(Duration::ZERO) {
            return Err(GatewayError::Config(
                "handshake_timeout must be non-zero".to_string(),
            ));
        }

        self.reconnect.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::new("wss://gateway.example.com");
        assert!(config.require_token);
        assert_eq!(config.decode_failure, DecodeFailurePolicy::Drop);
        assert!(config.handshake_timeout.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = GatewayConfig::new("ws://127.0.0.1:9000")
            .with_require_token(false)
            .with_decode_failure(DecodeFailurePolicy::Reconnect)
            .with_handshake_timeout(Duration::from_secs(5))
            .with_reconnect(ReconnectConfig {
                max_attempts: Some(3),
                ..ReconnectConfig::default()
            });

        assert!(!config.require_token);
        assert_eq!(config.decode_failure, DecodeFailurePolicy::Reconnect);
        assert_eq!(config.handshake_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.reconnect.max_attempts, Some(3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_websocket_url() {
        let err = GatewayConfig::new("https://gateway.example.com")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("must start with ws:// or wss://"));
    }

    #[test]
    fn test_validate_rejects_empty_url() {
        assert!(GatewayConfig::new("").validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_buffers() {
        let mut config = GatewayConfig::new("ws://localhost");
        config.frame_buffer = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_checks_reconnect() {
        let config = GatewayConfig::new("ws://localhost").with_reconnect(ReconnectConfig {
            jitter: -0.1,
            ..ReconnectConfig::default()
        });
        assert!(config.validate().is_err());
    }
}
