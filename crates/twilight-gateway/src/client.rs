//! Gateway client with automatic reconnection support.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, timeout_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use twilight_proto::{IdentifyFrame, InboundFrame};

use crate::config::{DecodeFailurePolicy, GatewayConfig};
use crate::credentials::CredentialProvider;
use crate::dispatcher::{EventDispatcher, ListenerId};
use crate::error::GatewayError;
use crate::events::{Envelope, LifecycleEvent};
use crate::reconnect::Backoff;
use crate::state::{AtomicConnectionState, ConnectionState};
use crate::transport::{Connection, Transport, TransportEvent, WebSocketTransport};

/// Tasks belonging to one `connect()` run.
struct RunHandle {
    cancel: CancellationToken,
    supervisor: JoinHandle<()>,
    dispatch: JoinHandle<()>,
}

/// A gateway client with automatic reconnection support.
///
/// Owns at most one live transport at a time. Inbound frames are decoded and
/// republished through the [`EventDispatcher`] under their `t` tag.
pub struct GatewayClient {
    config: GatewayConfig,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialProvider>,
    dispatcher: EventDispatcher,
    state: Arc<AtomicConnectionState>,
    generation: Arc<AtomicU64>,
    lifecycle: broadcast::Sender<LifecycleEvent>,
    run: Mutex<Option<RunHandle>>,
}

impl std::fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayClient")
            .field("url", &self.config.url)
            .field("state", &self.state.load())
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}

impl GatewayClient {
    /// Create a client that connects over WebSocket.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(
        config: GatewayConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, GatewayError> {
        Self::with_transport(config, credentials, Arc::new(WebSocketTransport))
    }

    /// Create a client over a custom transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_transport(
        config: GatewayConfig,
        credentials: Arc<dyn CredentialProvider>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, GatewayError> {
        config.validate()?;
        let (lifecycle, _) = broadcast::channel(config.lifecycle_buffer);
        Ok(Self {
            config,
            transport,
            credentials,
            dispatcher: EventDispatcher::new(),
            state: Arc::new(AtomicConnectionState::new(ConnectionState::Idle)),
            generation: Arc::new(AtomicU64::new(0)),
            lifecycle,
            run: Mutex::new(None),
        })
    }

    /// The client configuration.
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Get the current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state.load()
    }

    /// Identifier of the most recent connection attempt (0 before the first).
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// The dispatcher inbound frames are published through.
    #[must_use]
    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    /// Register a listener for event `tag`.
    pub fn on<F>(&self, tag: impl Into<String>, listener: F) -> ListenerId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.dispatcher.on(tag, listener)
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn off(&self, id: ListenerId) -> bool {
        self.dispatcher.off(id)
    }

    /// Subscribe to lifecycle events.
    ///
    /// Only events sent after this call are received.
    #[must_use]
    pub fn lifecycle(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.lifecycle.subscribe()
    }

    /// Start the connection supervisor.
    ///
    /// A no-op while a run is already active. Failures are reported through
    /// [`lifecycle`](Self::lifecycle), never returned. Must be called from
    /// within a Tokio runtime.
    pub fn connect(&self) {
        if !self.state.try_begin() {
            debug!(state = %self.state.load(), "gateway already connecting or connected");
            return;
        }

        let cancel = CancellationToken::new();
        let (frames_tx, frames_rx) = mpsc::channel(self.config.frame_buffer);

        let dispatch = tokio::spawn(dispatch_frames(
            frames_rx,
            self.dispatcher.clone(),
            Arc::clone(&self.generation),
        ));

        let supervisor = Supervisor {
            config: self.config.clone(),
            transport: Arc::clone(&self.transport),
            credentials: Arc::clone(&self.credentials),
            state: Arc::clone(&self.state),
            generation: Arc::clone(&self.generation),
            lifecycle: self.lifecycle.clone(),
            frames: frames_tx,
            cancel: cancel.clone(),
        };
        let supervisor = tokio::spawn(supervisor.run());

        info!(url = %self.config.url, "gateway client started");
        *self.run.lock() = Some(RunHandle {
            cancel,
            supervisor,
            dispatch,
        });
    }

    /// Stop the supervisor, close the live transport, and return to `Idle`.
    ///
    /// `connect()` may be called again afterwards.
    pub async fn shutdown(&self) {
        let Some(run) = self.run.lock().take() else {
            return;
        };

        run.cancel.cancel();
        if let Err(e) = run.supervisor.await {
            warn!(error = %e, "gateway supervisor task failed");
        }
        if let Err(e) = run.dispatch.await {
            warn!(error = %e, "gateway dispatch task failed");
        }

        self.state.store(ConnectionState::Idle);
        let _ = self.lifecycle.send(LifecycleEvent::Stopped);
        info!("gateway client stopped");
    }
}

impl Drop for GatewayClient {
    fn drop(&mut self) {
        if let Some(run) = self.run.get_mut().take() {
            run.cancel.cancel();
        }
    }
}

/// Deliver envelopes from the current generation; drop the rest.
async fn dispatch_frames(
    mut frames: mpsc::Receiver<Envelope>,
    dispatcher: EventDispatcher,
    generation: Arc<AtomicU64>,
) {
    while let Some(Envelope {
        generation: frame_generation,
        frame,
    }) = frames.recv().await
    {
        let current = generation.load(Ordering::SeqCst);
        if frame_generation != current {
            debug!(
                frame_generation,
                current,
                tag = %frame.tag,
                "discarding frame from superseded connection"
            );
            continue;
        }

        let delivered = dispatcher.emit(&frame.tag, &frame.data);
        trace!(tag = %frame.tag, delivered, "frame dispatched");
    }
}

/// How one connection attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// Cancelled by `shutdown()`.
    Stopped,
    /// Never became ready, or broke protocol.
    Failed,
    /// A ready session closed.
    Closed,
    /// The dispatch task is gone; frames can no longer be delivered.
    DispatchLost,
}

/// Deadline for the open + identify phase, with the limit for error reporting.
type Deadline = Option<(Instant, Duration)>;

async fn within<T>(
    deadline: Deadline,
    step: impl Future<Output = Result<T, GatewayError>>,
) -> Result<T, GatewayError> {
    match deadline {
        Some((at, limit)) => timeout_at(at, step)
            .await
            .map_err(|_| GatewayError::Timeout(limit))?,
        None => step.await,
    }
}

/// Owns the retry counter and the live transport for one run.
struct Supervisor {
    config: GatewayConfig,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialProvider>,
    state: Arc<AtomicConnectionState>,
    generation: Arc<AtomicU64>,
    lifecycle: broadcast::Sender<LifecycleEvent>,
    frames: mpsc::Sender<Envelope>,
    cancel: CancellationToken,
}

impl Supervisor {
    async fn run(self) {
        let mut backoff = Backoff::new(self.config.reconnect.clone());

        loop {
            match self.run_session().await {
                SessionEnd::Stopped => break,
                SessionEnd::DispatchLost => {
                    self.state.store(ConnectionState::Failed);
                    return;
                }
                SessionEnd::Closed => backoff.reset(),
                SessionEnd::Failed => {}
            }

            let Some(delay) = backoff.next_delay() else {
                let attempts = backoff.attempts();
                self.state.store(ConnectionState::Failed);
                warn!(attempts, "gateway reconnect attempts exhausted, giving up");
                self.notify(LifecycleEvent::ReconnectFailed { attempts });
                return;
            };

            let attempt = backoff.attempts();
            self.state.store(ConnectionState::Backoff);
            info!(attempt, delay_ms = delay.as_millis() as u64, "reconnecting to gateway");
            self.notify(LifecycleEvent::Reconnecting { attempt, delay });

            tokio::select! {
                () = self.cancel.cancelled() => break,
                () = sleep(delay) => {}
            }
        }

        self.state.store(ConnectionState::Idle);
    }

    async fn run_session(&self) -> SessionEnd {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.store(ConnectionState::Opening);
        debug!(generation, url = %self.config.url, "opening gateway connection");

        let deadline: Deadline = self
            .config
            .handshake_timeout
            .map(|limit| (Instant::now() + limit, limit));

        let opened = tokio::select! {
            () = self.cancel.cancelled() => return SessionEnd::Stopped,
            result = within(deadline, self.transport.open(&self.config.url)) => result,
        };
        let mut conn = match opened {
            Ok(conn) => conn,
            Err(e) => return self.connect_failed(generation, &e),
        };
        self.state.store(ConnectionState::Authenticating);

        let identified = tokio::select! {
            () = self.cancel.cancelled() => {
                self.state.store(ConnectionState::Closing);
                conn.close().await;
                return SessionEnd::Stopped;
            }
            result = within(deadline, self.identify(generation, conn.as_mut())) => result,
        };
        if let Err(e) = identified {
            conn.close().await;
            return self.connect_failed(generation, &e);
        }

        self.state.store(ConnectionState::Ready);
        info!(generation, "gateway session ready");
        self.notify(LifecycleEvent::Ready { generation });

        self.receive(generation, conn.as_mut()).await
    }

    /// Fetch the token and send exactly one identify frame on `conn`.
    async fn identify(
        &self,
        generation: u64,
        conn: &mut dyn Connection,
    ) -> Result<(), GatewayError> {
        let token = self.credentials.token().await;
        if token.is_none() {
            if self.config.require_token {
                return Err(GatewayError::MissingToken);
            }
            warn!(generation, "identifying without an auth token");
        }

        let json = IdentifyFrame::new(token).to_json()?;
        conn.send(json)
            .await
            .map_err(|e| GatewayError::Handshake(e.to_string()))?;
        debug!(generation, "identify frame sent");
        Ok(())
    }

    fn connect_failed(&self, generation: u64, error: &GatewayError) -> SessionEnd {
        warn!(generation, error = %error, "gateway connection attempt failed");
        self.notify(LifecycleEvent::ConnectFailed {
            generation,
            error: error.to_string(),
        });
        SessionEnd::Failed
    }

    async fn receive(&self, generation: u64, conn: &mut dyn Connection) -> SessionEnd {
        loop {
            let event = tokio::select! {
                () = self.cancel.cancelled() => {
                    self.state.store(ConnectionState::Closing);
                    conn.close().await;
                    return SessionEnd::Stopped;
                }
                event = conn.recv() => event,
            };

            match event {
                TransportEvent::Text(text) => match InboundFrame::from_json(&text) {
                    Ok(frame) => {
                        trace!(generation, tag = %frame.tag, "frame received");
                        if self.frames.send(Envelope { generation, frame }).await.is_err() {
                            error!(generation, "gateway dispatch stopped, closing connection");
                            self.state.store(ConnectionState::Closing);
                            conn.close().await;
                            self.notify(LifecycleEvent::Disconnected {
                                generation,
                                code: None,
                                reason: "dispatch stopped".to_string(),
                            });
                            return SessionEnd::DispatchLost;
                        }
                    }
                    Err(e) => {
                        warn!(generation, error = %e, "dropping malformed gateway frame");
                        self.notify(LifecycleEvent::FrameDropped {
                            generation,
                            error: e.to_string(),
                        });
                        if self.config.decode_failure == DecodeFailurePolicy::Reconnect {
                            conn.close().await;
                            self.notify(LifecycleEvent::Disconnected {
                                generation,
                                code: None,
                                reason: format!("protocol violation: {e}"),
                            });
                            return SessionEnd::Failed;
                        }
                    }
                },
                TransportEvent::Closed { code, reason } => {
                    warn!(generation, ?code, reason = %reason, "gateway connection closed");
                    self.notify(LifecycleEvent::Disconnected {
                        generation,
                        code,
                        reason,
                    });
                    return SessionEnd::Closed;
                }
            }
        }
    }

    fn notify(&self, event: LifecycleEvent) {
        // No subscribers is fine.
        let _ = self.lifecycle.send(event);
    }
}
