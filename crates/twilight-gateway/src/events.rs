//! Lifecycle events and the receive-to-dispatch envelope.

use std::time::Duration;

use twilight_proto::InboundFrame;

/// Connection lifecycle signals broadcast by the gateway client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Handshake sent; frames from this generation will be dispatched.
    Ready {
        /// Connection attempt identifier.
        generation: u64,
    },
    /// An attempt failed before reaching `Ready`.
    ConnectFailed {
        /// Connection attempt identifier.
        generation: u64,
        /// What went wrong.
        error: String,
    },
    /// A ready session ended.
    Disconnected {
        /// Connection attempt identifier.
        generation: u64,
        /// Close code, if any.
        code: Option<u16>,
        /// Close reason.
        reason: String,
    },
    /// Waiting before another attempt.
    Reconnecting {
        /// Attempt number since the last ready session (1-based).
        attempt: u32,
        /// Delay before the attempt.
        delay: Duration,
    },
    /// Retry budget exhausted; no further attempts will be made.
    ReconnectFailed {
        /// Attempts made since the last ready session.
        attempts: u32,
    },
    /// An inbound frame could not be decoded.
    FrameDropped {
        /// Connection attempt identifier.
        generation: u64,
        /// Decode error.
        error: String,
    },
    /// The client was shut down.
    Stopped,
}

/// An inbound frame tagged with the connection attempt it arrived on.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    /// Connection attempt identifier.
    pub generation: u64,
    /// The decoded frame.
    pub frame: InboundFrame,
}
