//! Connection state types.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// State of the gateway connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Never started, or shut down.
    Idle,
    /// Opening the transport.
    Opening,
    /// Transport open, fetching the token and sending the handshake.
    Authenticating,
    /// Handshake sent; frames are being dispatched.
    Ready,
    /// Shutting down the live transport.
    Closing,
    /// Waiting before the next reconnection attempt.
    Backoff,
    /// Retry budget exhausted. No further attempts are made.
    Failed,
}

impl ConnectionState {
    /// Whether a supervisor is running for this state.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Idle | Self::Failed)
    }

    /// Whether frames are currently being received.
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    const fn from_u32(value: u32) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Opening,
            2 => Self::Authenticating,
            3 => Self::Ready,
            4 => Self::Closing,
            5 => Self::Backoff,
            _ => Self::Failed,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Opening => "opening",
            Self::Authenticating => "authenticating",
            Self::Ready => "ready",
            Self::Closing => "closing",
            Self::Backoff => "backoff",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Atomic wrapper for connection state.
#[derive(Debug)]
pub struct AtomicConnectionState(AtomicU32);

impl AtomicConnectionState {
    /// Create a new atomic state.
    #[must_use]
    pub const fn new(state: ConnectionState) -> Self {
        Self(AtomicU32::new(state as u32))
    }

    /// Load the current state.
    #[must_use]
    pub fn load(&self) -> ConnectionState {
        ConnectionState::from_u32(self.0.load(Ordering::SeqCst))
    }

    /// Store a new state.
    pub fn store(&self, state: ConnectionState) {
        self.0.store(state as u32, Ordering::SeqCst);
    }

    /// Move from `Idle` or `Failed` to `Opening` in one step.
    ///
    /// Returns `false` without changing anything if a session is already
    /// active.
    pub fn try_begin(&self) -> bool {
        [ConnectionState::Idle, ConnectionState::Failed]
            .into_iter()
            .any(|from| {
                self.0
                    .compare_exchange(
                        from as u32,
                        ConnectionState::Opening as u32,
                        Ordering::SeqCst,
                        Ordering::SeqCst,
                    )
                    .is_ok()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_state_enum() {
        assert_eq!(ConnectionState::Idle as u32, 0);
        assert_eq!(ConnectionState::Opening as u32, 1);
        assert_eq!(ConnectionState::Authenticating as u32, 2);
        assert_eq!(ConnectionState::Ready as u32, 3);
        assert_eq!(ConnectionState::Closing as u32, 4);
        assert_eq!(ConnectionState::Backoff as u32, 5);
        assert_eq!(ConnectionState::Failed as u32, 6);
    }

    #[test]
    fn test_atomic_connection_state() {
        let state = AtomicConnectionState::new(ConnectionState::Idle);
        assert_eq!(state.load(), ConnectionState::Idle);

        for next in [
            ConnectionState::Opening,
            ConnectionState::Authenticating,
            ConnectionState::Ready,
            ConnectionState::Closing,
            ConnectionState::Backoff,
            ConnectionState::Failed,
        ] {
            state.store(next);
            assert_eq!(state.load(), next);
        }
    }

    #[test]
    fn test_try_begin_from_idle() {
        let state = AtomicConnectionState::new(ConnectionState::Idle);
        assert!(state.try_begin());
        assert_eq!(state.load(), ConnectionState::Opening);
        assert!(!state.try_begin());
    }

    #[test]
    fn test_try_begin_from_failed() {
        let state = AtomicConnectionState::new(ConnectionState::Failed);
        assert!(state.try_begin());
        assert_eq!(state.load(), ConnectionState::Opening);
    }

    #[test]
    fn test_try_begin_rejected_while_active() {
        for active in [
            ConnectionState::Opening,
            ConnectionState::Authenticating,
            ConnectionState::Ready,
            ConnectionState::Closing,
            ConnectionState::Backoff,
        ] {
            let state = AtomicConnectionState::new(active);
            assert!(!state.try_begin(), "{active} should not restart");
            assert_eq!(state.load(), active);
        }
    }

    #[test]
    fn test_is_active() {
        assert!(!ConnectionState::Idle.is_active());
        assert!(!ConnectionState::Failed.is_active());
        assert!(ConnectionState::Backoff.is_active());
        assert!(ConnectionState::Ready.is_ready());
        assert!(!ConnectionState::Authenticating.is_ready());
    }

    #[test]
    fn test_display() {
        assert_eq!(ConnectionState::Authenticating.to_string(), "authenticating");
        assert_eq!(ConnectionState::Backoff.to_string(), "backoff");
    }
}
