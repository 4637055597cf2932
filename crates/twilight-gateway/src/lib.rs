//! # twilight-gateway
//!
//! Persistent, auto-reconnecting client for the Twilight event gateway.
//!
//! A [`GatewayClient`] keeps one WebSocket open, identifies with a token from
//! a [`CredentialProvider`] after every open, and republishes each inbound
//! `{ "t": tag, "d": payload }` frame to listeners registered on its
//! [`EventDispatcher`]. Closures are retried with exponential backoff until
//! the configured attempt budget runs out.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use twilight_gateway::{GatewayClient, GatewayConfig, StaticToken};
//!
//! # async fn example() -> Result<(), twilight_gateway::GatewayError> {
//! let client = GatewayClient::new(
//!     GatewayConfig::new("wss://gateway.example.com"),
//!     Arc::new(StaticToken::new("token")),
//! )?;
//! client.on("MESSAGE_CREATE", |payload| println!("{payload}"));
//! client.connect();
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
pub mod config;
pub mod credentials;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod reconnect;
pub mod state;
pub mod transport;

#[cfg(test)]
mod testing;

pub use client::GatewayClient;
pub use config::{DecodeFailurePolicy, GatewayConfig};
pub use credentials::{CredentialProvider, StaticToken, TokenCell};
pub use dispatcher::{EventDispatcher, Listener, ListenerId};
pub use error::GatewayError;
pub use events::{Envelope, LifecycleEvent};
pub use reconnect::{Backoff, ReconnectConfig, calculate_backoff};
pub use state::{AtomicConnectionState, ConnectionState};
pub use transport::{Connection, Transport, TransportEvent, WebSocketTransport};
