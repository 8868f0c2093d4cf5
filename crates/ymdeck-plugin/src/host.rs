//! Connection to the Stream Deck host.
//!
//! The host listens on `ws://127.0.0.1:<port>`. After the socket opens the
//! plugin registers itself and asks for its global settings; from then on
//! inbound text frames are handed to the router and outbound commands are
//! drained from a [`HostSender`] queue.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use ymdeck_config::HostConfig;
use ymdeck_protocols::OutboundMessage;

use crate::error::HostError;

type HostSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Cloneable handle for queueing messages to the host.
///
/// Messages queued while the socket is down are sent after the next connect.
#[derive(Debug, Clone)]
pub struct HostSender {
    tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl HostSender {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<OutboundMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, message: OutboundMessage) -> Result<(), HostError> {
        trace!(event = %message.event, "Queueing host message");
        self.tx.send(message).map_err(|_| HostError::QueueClosed)
    }
}

/// Where and how to reach the host.
#[derive(Debug, Clone)]
pub struct HostSettings {
    pub url: String,
    pub register_event: String,
    pub plugin_uuid: String,
    /// Consecutive failed attempts before giving up.
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl HostSettings {
    pub fn new(port: u16, register_event: &str, plugin_uuid: &str) -> Self {
        Self::from_config(port, register_event, plugin_uuid, &HostConfig::default())
    }

    pub fn from_config(
        port: u16,
        register_event: &str,
        plugin_uuid: &str,
        config: &HostConfig,
    ) -> Self {
        Self {
            url: format!("ws://127.0.0.1:{}", port),
            register_event: register_event.to_string(),
            plugin_uuid: plugin_uuid.to_string(),
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
        }
    }
}

/// How a connected session ended.
#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    /// The host closed the socket; the plugin should exit.
    Closed,
    /// Shutdown requested locally.
    Cancelled,
}

/// Host socket supervisor.
pub struct HostConnection {
    settings: HostSettings,
    outbound: mpsc::UnboundedReceiver<OutboundMessage>,
}

impl HostConnection {
    pub fn new(settings: HostSettings, outbound: mpsc::UnboundedReceiver<OutboundMessage>) -> Self {
        Self { settings, outbound }
    }

    /// Run until the host closes the socket, `cancel` fires, or
    /// `max_retries` consecutive attempts fail.
    ///
    /// Every inbound text frame is forwarded to `inbound` unparsed.
    pub async fn run(
        mut self,
        inbound: mpsc::UnboundedSender<String>,
        cancel: CancellationToken,
    ) -> Result<(), HostError> {
        let mut failures: u32 = 0;
        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }

            let attempt = tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                res = tokio_tungstenite::connect_async(self.settings.url.as_str()) => res,
            };

            match attempt {
                Ok((socket, _)) => {
                    failures = 0;
                    info!(url = %self.settings.url, "Connected to Stream Deck host");
                    match self.session(socket, &inbound, &cancel).await {
                        Ok(SessionEnd::Closed) => {
                            info!("Host closed the connection, shutting down");
                            return Ok(());
                        }
                        Ok(SessionEnd::Cancelled) => return Ok(()),
                        Err(e) => {
                            failures += 1;
                            warn!(error = %e, attempt = failures, "Host connection lost");
                        }
                    }
                }
                Err(e) => {
                    failures += 1;
                    warn!(error = %e, attempt = failures, "Cannot connect to host");
                }
            }

            if failures >= self.settings.max_retries {
                error!(failures, "Max retries reached, shutting down");
                return Err(HostError::RetriesExhausted(failures));
            }

            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                _ = tokio::time::sleep(self.settings.retry_delay) => {}
            }
        }
    }

    async fn session(
        &mut self,
        mut socket: HostSocket,
        inbound: &mpsc::UnboundedSender<String>,
        cancel: &CancellationToken,
    ) -> Result<SessionEnd, HostError> {
        let register =
            OutboundMessage::register(&self.settings.register_event, &self.settings.plugin_uuid);
        let globals = OutboundMessage::get_global_settings(&self.settings.plugin_uuid);
        for message in [register, globals] {
            send(&mut socket, &message).await?;
        }

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    let _ = socket.close(None).await;
                    return Ok(SessionEnd::Cancelled);
                }
                out = self.outbound.recv() => match out {
                    Some(message) => send(&mut socket, &message).await?,
                    None => {
                        debug!("All host senders dropped");
                        let _ = socket.close(None).await;
                        return Ok(SessionEnd::Cancelled);
                    }
                },
                msg = socket.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        trace!(len = text.len(), "Host message");
                        if inbound.send(text.as_str().to_string()).is_err() {
                            debug!("Router gone, closing host connection");
                            let _ = socket.close(None).await;
                            return Ok(SessionEnd::Cancelled);
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => return Ok(SessionEnd::Closed),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                }
            }
        }
    }
}

async fn send(socket: &mut HostSocket, message: &OutboundMessage) -> Result<(), HostError> {
    let json = message.to_json()?;
    socket.send(Message::Text(json.into())).await?;
    Ok(())
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
