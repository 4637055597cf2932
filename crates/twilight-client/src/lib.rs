//! # twilight-client
//!
//! The pieces around the gateway: the account HTTP API, the in-memory user
//! store, and [`Session`], which ties them to a [`GatewayClient`] sharing
//! one token.
//!
//! [`GatewayClient`]: twilight_gateway::GatewayClient

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod error;
pub mod session;
pub mod store;

pub use api::{ApiClient, ApiConfig, ApiResponse};
pub use error::ClientError;
pub use session::Session;
pub use store::UserStore;
