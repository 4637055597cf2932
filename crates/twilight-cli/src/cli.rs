//! Command-line argument parsing with clap.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use twilight_gateway::config::GATEWAY_URL_ENV;
use twilight_gateway::{DecodeFailurePolicy, GatewayConfig, ReconnectConfig};

/// Twilight command-line client.
#[derive(Parser, Debug, Clone)]
#[command(name = "twilight")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Stream gateway events as JSON lines.
    Listen(ListenArgs),

    /// Create an account.
    Register(RegisterArgs),

    /// Log in and print the response.
    Login(LoginArgs),
}

/// Arguments for `listen`.
#[derive(Args, Debug, Clone)]
pub struct ListenArgs {
    /// Gateway WebSocket URL.
    #[arg(short, long, env = GATEWAY_URL_ENV)]
    pub gateway: String,

    /// Auth token sent in the identify frame.
    #[arg(short, long, env = "TWILIGHT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Event tag to print; repeat for several.
    #[arg(short, long = "event", value_name = "TAG", required = true)]
    pub events: Vec<String>,

    /// Connect even without a token.
    #[arg(long)]
    pub anonymous: bool,

    /// Reconnection attempts before giving up.
    #[arg(long, default_value_t = 1000)]
    pub max_attempts: u32,

    /// Initial reconnect delay in milliseconds.
    #[arg(long, default_value_t = 100)]
    pub initial_delay_ms: u64,

    /// Maximum reconnect delay in milliseconds.
    #[arg(long, default_value_t = 60_000)]
    pub max_delay_ms: u64,

    /// Reconnect instead of skipping frames that fail to decode.
    #[arg(long)]
    pub strict: bool,

    /// Exit after printing this many events.
    #[arg(short = 'n', long)]
    pub count: Option<usize>,
}

impl ListenArgs {
    /// Gateway configuration for these arguments.
    #[must_use]
    pub fn gateway_config(&self) -> GatewayConfig {
        let reconnect = ReconnectConfig {
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            max_attempts: Some(self.max_attempts),
            ..ReconnectConfig::default()
        };
        let decode_failure = if self.strict {
            DecodeFailurePolicy::Reconnect
        } else {
            DecodeFailurePolicy::Drop
        };
        GatewayConfig::new(self.gateway.clone())
            .with_reconnect(reconnect)
            .with_require_token(!self.anonymous)
            .with_decode_failure(decode_failure)
    }
}

/// Arguments for `register`.
#[derive(Args, Debug, Clone)]
pub struct RegisterArgs {
    /// Account API base URL.
    #[arg(short, long, env = twilight_client::api::API_URL_ENV)]
    pub api: String,

    /// Unique handle.
    #[arg(short, long)]
    pub username: String,

    /// Email address.
    #[arg(short, long)]
    pub email: String,

    /// Password.
    #[arg(short, long, env = "TWILIGHT_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Arguments for `login`.
#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    /// Account API base URL.
    #[arg(short, long, env = twilight_client::api::API_URL_ENV)]
    pub api: String,

    /// Email address.
    #[arg(short, long)]
    pub email: String,

    /// Password.
    #[arg(short, long, env = "TWILIGHT_PASSWORD", hide_env_values = true)]
    pub password: String,
}
