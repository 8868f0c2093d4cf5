//! Core session struct, receive loop and CDP command dispatch.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace, warn};

use crate::cdp::error::CdpError;
use crate::cdp::protocol::{CdpEvent, CdpRequest, CdpResponse};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Value, CdpError>>>>>;

/// A session on one page's debugger socket.
pub struct PageSession {
    ws_url: String,
    ws_tx: tokio::sync::Mutex<WsSink>,
    /// Requests waiting for their response, by id.
    pending: PendingMap,
    request_id: AtomicU64,
    timeout: Duration,
    /// Set once the receive loop has exited.
    closed: Arc<AtomicBool>,
    /// Taken by the first caller of [`events`](Self::events).
    events: Mutex<Option<mpsc::UnboundedReceiver<CdpEvent>>>,
    recv_task: tokio::task::JoinHandle<()>,
}

impl PageSession {
    /// Open the page socket at `ws_url`.
    pub async fn connect(ws_url: &str, timeout: Duration) -> Result<Self, CdpError> {
        let connect = tokio_tungstenite::connect_async(ws_url);
        let (ws_stream, _) = tokio::time::timeout(timeout, connect)
            .await
            .map_err(|_| CdpError::Timeout(format!("connecting to {}", ws_url)))?
            .map_err(|e| CdpError::ConnectionFailed(format!("WebSocket: {}", e)))?;

        let (ws_sink, ws_source) = ws_stream.split();
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let closed = Arc::new(AtomicBool::new(false));
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let recv_task = {
            let pending = pending.clone();
            let closed = closed.clone();
            tokio::spawn(async move {
                Self::receive_loop(ws_source, &pending, event_tx).await;
                closed.store(true, Ordering::SeqCst);
                // Dropping the senders fails every waiter with SessionClosed.
                pending.lock().clear();
            })
        };

        debug!("CDP session connected to {}", ws_url);

        Ok(Self {
            ws_url: ws_url.to_string(),
            ws_tx: tokio::sync::Mutex::new(ws_sink),
            pending,
            request_id: AtomicU64::new(1),
            timeout,
            closed,
            events: Mutex::new(Some(event_rx)),
            recv_task,
        })
    }

    async fn receive_loop(
        mut ws_source: WsSource,
        pending: &PendingMap,
        events: mpsc::UnboundedSender<CdpEvent>,
    ) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    trace!("CDP recv: {}", text);
                    match serde_json::from_str::<CdpResponse>(&text) {
                        Ok(resp) => Self::dispatch(resp, pending, &events),
                        Err(e) => warn!("Failed to parse CDP message: {}", e),
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("Page socket closed");
                    break;
                }
                Err(e) => {
                    debug!("Page socket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    }

    fn dispatch(
        resp: CdpResponse,
        pending: &PendingMap,
        events: &mpsc::UnboundedSender<CdpEvent>,
    ) {
        if let Some(id) = resp.id {
            let Some(tx) = pending.lock().remove(&id) else {
                trace!(id, "Response for unknown request");
                return;
            };
            let result = match resp.error {
                Some(error) => Err(CdpError::Protocol {
                    code: error.code,
                    message: error.message,
                }),
                None => Ok(resp.result.unwrap_or(Value::Null)),
            };
            let _ = tx.send(result);
        } else if let Some(method) = resp.method {
            let _ = events.send(CdpEvent {
                method,
                params: resp.params.unwrap_or(Value::Null),
            });
        }
    }

    pub fn ws_url(&self) -> &str {
        &self.ws_url
    }

    /// Whether the page socket has gone away.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Page events. Returns `None` after the first call.
    pub fn events(&self) -> Option<mpsc::UnboundedReceiver<CdpEvent>> {
        self.events.lock().take()
    }

    /// Send a CDP command and wait for its result.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        if self.is_closed() {
            return Err(CdpError::SessionClosed);
        }
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
        };

        let json = serde_json::to_string(&request)?;
        trace!("CDP send: {}", json);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);

        {
            let mut ws = self.ws_tx.lock().await;
            if let Err(e) = ws.send(Message::Text(json.into())).await {
                self.pending.lock().remove(&id);
                return Err(e.into());
            }
        }

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(CdpError::SessionClosed),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(CdpError::Timeout(format!("Request {} timed out", method)))
            }
        }
    }

    /// Enable the domains whose events the link watches.
    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Runtime.enable", None).await?;
        self.call("Page.enable", None).await?;

        debug!("Enabled CDP domains for {}", self.ws_url);
        Ok(())
    }

    /// Close the socket. In-flight calls fail with [`CdpError::SessionClosed`].
    pub async fn close(&self) {
        let mut ws = self.ws_tx.lock().await;
        if let Err(e) = ws.close().await {
            trace!("Close on page socket failed: {}", e);
        }
    }
}

impl Drop for PageSession {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}
