//! Transport seam and the WebSocket implementation.
//!
//! The supervisor only sees [`Transport`] and [`Connection`], so the
//! reconnection policy can be driven by a scripted transport in tests.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace};

use crate::error::GatewayError;

/// Close code reported when the peer vanished without a close frame.
pub const ABNORMAL_CLOSURE: u16 = 1006;

/// Something observed on an open connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// One text frame.
    Text(String),
    /// The connection is gone. No further events follow.
    Closed {
        /// Close code, if the peer sent one.
        code: Option<u16>,
        /// Close reason or error text.
        reason: String,
    },
}

/// Opens connections to the gateway.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Open a new connection to `url`.
    async fn open(&self, url: &str) -> Result<Box<dyn Connection>, GatewayError>;
}

/// One open, message-oriented connection.
#[async_trait]
pub trait Connection: Send {
    /// Send one text frame.
    async fn send(&mut self, text: String) -> Result<(), GatewayError>;

    /// Wait for the next event. Must be cancel-safe.
    async fn recv(&mut self) -> TransportEvent;

    /// Close the connection normally. Errors are ignored.
    async fn close(&mut self);
}

/// [`Transport`] over `tokio-tungstenite`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketTransport;

#[async_trait]
impl Transport for WebSocketTransport {
    async fn open(&self, url: &str) -> Result<Box<dyn Connection>, GatewayError> {
        let (ws, _response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| GatewayError::Transport(format!("failed to connect: {e}")))?;
        debug!(url = %url, "websocket connected");
        Ok(Box::new(WebSocketConnection { ws }))
    }
}

/// A live WebSocket connection.
pub struct WebSocketConnection {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl std::fmt::Debug for WebSocketConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSocketConnection").finish_non_exhaustive()
    }
}

#[async_trait]
impl Connection for WebSocketConnection {
    async fn send(&mut self, text: String) -> Result<(), GatewayError> {
        self.ws
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| GatewayError::Transport(format!("failed to send: {e}")))
    }

    async fn recv(&mut self) -> TransportEvent {
        loop {
            match self.ws.next().await {
                Some(Ok(Message::Text(text))) => return TransportEvent::Text(text.to_string()),
                Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                    Ok(text) => return TransportEvent::Text(text.to_string()),
                    Err(_) => debug!(len = bytes.len(), "ignoring non-UTF-8 binary frame"),
                },
                Some(Ok(Message::Close(frame))) => {
                    return match frame {
                        Some(frame) => TransportEvent::Closed {
                            code: Some(u16::from(frame.code)),
                            reason: frame.reason.to_string(),
                        },
                        None => TransportEvent::Closed {
                            code: None,
                            reason: String::new(),
                        },
                    };
                }
                Some(Ok(other)) => {
                    // Ping/Pong are answered by tungstenite itself
                    trace!(?other, "ignoring control frame");
                }
                Some(Err(e)) => {
                    return TransportEvent::Closed {
                        code: Some(ABNORMAL_CLOSURE),
                        reason: e.to_string(),
                    };
                }
                None => {
                    return TransportEvent::Closed {
                        code: Some(ABNORMAL_CLOSURE),
                        reason: "connection closed".to_string(),
                    };
                }
            }
        }
    }

    async fn close(&mut self) {
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: "client shutdown".into(),
        };
        if let Err(e) = self.ws.close(Some(frame)).await {
            debug!(error = %e, "error while closing websocket");
        }
    }
}
