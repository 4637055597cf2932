//! `twilight listen`: print gateway events as JSON lines.

use std::io::Write;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use twilight_gateway::{
    CredentialProvider, GatewayClient, GatewayConfig, LifecycleEvent, StaticToken,
};
use twilight_proto::InboundFrame;

use crate::cli::ListenArgs;

/// Subscribes to a set of tags and writes each matching frame as one line.
#[derive(Debug, Clone)]
pub struct ListenCommand {
    config: GatewayConfig,
    token: Option<String>,
    events: Vec<String>,
    count: Option<usize>,
}

impl ListenCommand {
    /// Create the command from parsed arguments.
    #[must_use]
    pub fn new(args: &ListenArgs) -> Self {
        Self {
            config: args.gateway_config(),
            token: args.token.clone(),
            events: args.events.clone(),
            count: args.count,
        }
    }

    /// Run until interrupted, until `count` events were printed, or until
    /// the gateway gives up reconnecting.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, output cannot be
    /// written, or the retry budget is exhausted.
    pub async fn execute<W: Write>(&self, writer: &mut W) -> Result<()> {
        let credentials: Arc<dyn CredentialProvider> = match &self.token {
            Some(token) => Arc::new(StaticToken::new(token.clone())),
            None => Arc::new(StaticToken::none()),
        };
        let client = GatewayClient::new(self.config.clone(), credentials)?;

        let (tx, mut frames) = mpsc::unbounded_channel();
        for tag in &self.events {
            let tx = tx.clone();
            let owned = tag.clone();
            client.on(tag.clone(), move |payload| {
                let _ = tx.send(InboundFrame::new(owned.clone(), payload.clone()));
            });
        }
        drop(tx);

        let mut lifecycle = client.lifecycle();
        info!(url = %self.config.url, events = ?self.events, "listening");
        client.connect();

        let mut printed = 0usize;
        let result = loop {
            tokio::select! {
                Some(frame) = frames.recv() => {
                    if let Err(e) = write_frame(writer, &frame) {
                        break Err(e);
                    }
                    printed += 1;
                    if self.count.is_some_and(|n| printed >= n) {
                        break Ok(());
                    }
                }
                event = lifecycle.recv() => match event {
                    Ok(LifecycleEvent::ReconnectFailed { attempts }) => {
                        break Err(anyhow!("gave up after {attempts} reconnection attempts"));
                    }
                    Ok(event) => debug!(?event, "lifecycle"),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "lifecycle events lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break Ok(()),
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupted");
                    break Ok(());
                }
            }
        };

        client.shutdown().await;
        result
    }
}

fn write_frame<W: Write>(writer: &mut W, frame: &InboundFrame) -> Result<()> {
    writeln!(writer, "{}", frame.to_json()?)?;
    writer.flush()?;
    Ok(())
}
