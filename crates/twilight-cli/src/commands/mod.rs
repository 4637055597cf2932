//! CLI command implementations.
//!
//! - [`listen`] - Stream gateway events
//! - [`account`] - Register and log in

pub mod account;
pub mod listen;

pub use account::AccountCommand;
pub use listen::ListenCommand;
