//! Scripted in-memory transport for driving the supervisor without a socket.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::GatewayError;
use crate::transport::{ABNORMAL_CLOSURE, Connection, Transport, TransportEvent};

/// One text frame sent by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Sent {
    /// 1-based index of the `open()` call that produced the connection.
    pub connection: usize,
    pub text: String,
}

enum Step {
    Refuse,
    Accept(mpsc::UnboundedReceiver<TransportEvent>),
}

/// Hands out connections according to a script; refuses once it runs out.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    opens: AtomicUsize,
    sent: Arc<Mutex<Vec<Sent>>>,
    closed: Arc<Mutex<Vec<usize>>>,
    live: Arc<AtomicUsize>,
    max_live: AtomicUsize,
}

/// Server side of a scripted connection.
pub(crate) struct Peer {
    tx: mpsc::UnboundedSender<TransportEvent>,
}

impl Peer {
    pub fn send_text(&self, text: &str) {
        let _ = self.tx.send(TransportEvent::Text(text.to_string()));
    }

    pub fn frame(&self, tag: &str, data: Value) {
        let text = serde_json::json!({ "t": tag, "d": data }).to_string();
        let _ = self.tx.send(TransportEvent::Text(text));
    }

    pub fn close(&self, code: u16, reason: &str) {
        let _ = self.tx.send(TransportEvent::Closed {
            code: Some(code),
            reason: reason.to_string(),
        });
    }
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue an accepted connection. Events pushed to the returned peer are
    /// delivered once the client starts reading.
    pub fn accept(&self) -> Peer {
        let (tx, rx) = mpsc::unbounded_channel();
        self.script.lock().push_back(Step::Accept(rx));
        Peer { tx }
    }

    /// Queue a refused connection.
    pub fn refuse(&self) {
        self.script.lock().push_back(Step::Refuse);
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.sent.lock().iter().map(|s| s.text.clone()).collect()
    }

    /// Connections the client closed itself.
    pub fn closed(&self) -> Vec<usize> {
        self.closed.lock().clone()
    }

    /// Connections handed out and not yet dropped.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Highest number of connections alive at once.
    pub fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn open(&self, _url: &str) -> Result<Box<dyn Connection>, GatewayError> {
        let index = self.opens.fetch_add(1, Ordering::SeqCst) + 1;
        let step = self.script.lock().pop_front();
        match step {
            Some(Step::Accept(inbound)) => {
                let now = self.live.fetch_add(1, Ordering::SeqCst) + 1;
                self.max_live.fetch_max(now, Ordering::SeqCst);
                Ok(Box::new(ScriptedConnection {
                    index,
                    inbound,
                    sent: Arc::clone(&self.sent),
                    closed: Arc::clone(&self.closed),
                    live: Arc::clone(&self.live),
                }))
            }
            Some(Step::Refuse) | None => {
                Err(GatewayError::Transport("connection refused".to_string()))
            }
        }
    }
}

struct ScriptedConnection {
    index: usize,
    inbound: mpsc::UnboundedReceiver<TransportEvent>,
    sent: Arc<Mutex<Vec<Sent>>>,
    closed: Arc<Mutex<Vec<usize>>>,
    live: Arc<AtomicUsize>,
}

impl Drop for ScriptedConnection {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connection for ScriptedConnection {
    async fn send(&mut self, text: String) -> Result<(), GatewayError> {
        self.sent.lock().push(Sent {
            connection: self.index,
            text,
        });
        Ok(())
    }

    async fn recv(&mut self) -> TransportEvent {
        self.inbound
            .recv()
            .await
            .unwrap_or_else(|| TransportEvent::Closed {
                code: Some(ABNORMAL_CLOSURE),
                reason: "peer dropped".to_string(),
            })
    }

    async fn close(&mut self) {
        self.closed.lock().push(self.index);
    }
}
