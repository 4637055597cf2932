//! # twilight-cli
//!
//! Command-line client for Twilight.
//!
//! - `listen` connects to the gateway and prints matching events as JSON
//!   lines, reconnecting as needed
//! - `register` and `login` call the account API and print the response

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands, ListenArgs, LoginArgs, RegisterArgs};
