//! # twilight-proto
//!
//! Wire frames exchanged with the Twilight event gateway, plus the profile
//! models returned by the account API.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod frames;
pub mod models;

pub use error::ProtoError;
pub use frames::{IdentifyData, IdentifyFrame, InboundFrame, Opcode};
pub use models::{Account, Actor};
