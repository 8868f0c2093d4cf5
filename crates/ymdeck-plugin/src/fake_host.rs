//! Stand-in for the Stream Deck host's WebSocket server.

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

enum Outgoing {
    Text(String),
    Close,
}

/// Accepts one plugin connection and records every message it sends.
pub(crate) struct FakeHost {
    pub port: u16,
    received: Arc<Mutex<Vec<Value>>>,
    outgoing: mpsc::UnboundedSender<Outgoing>,
    _task: tokio::task::JoinHandle<()>,
}

impl FakeHost {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let received = Arc::new(Mutex::new(Vec::new()));
        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel();

        let log = received.clone();
        let task = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            loop {
                tokio::select! {
                    msg = ws.next() => match msg {
                        Some(Ok(Message::Text(text))) => {
                            log.lock().push(serde_json::from_str(&text).unwrap());
                        }
                        Some(Ok(_)) => {}
                        _ => break,
                    },
                    out = outgoing_rx.recv() => match out {
                        Some(Outgoing::Text(text)) => {
                            let _ = ws.send(Message::Text(text.into())).await;
                        }
                        Some(Outgoing::Close) | None => {
                            let _ = ws.close(None).await;
                            break;
                        }
                    }
                }
            }
        });

        Self {
            port,
            received,
            outgoing,
            _task: task,
        }
    }

    pub fn push(&self, message: Value) {
        let _ = self.outgoing.send(Outgoing::Text(message.to_string()));
    }

    pub fn close(&self) {
        let _ = self.outgoing.send(Outgoing::Close);
    }

    pub fn received(&self) -> Vec<Value> {
        self.received.lock().clone()
    }

    /// Wait until at least `count` messages arrived.
    pub async fn wait_for(&self, count: usize) -> Vec<Value> {
        for _ in 0..200 {
            let received = self.received();
            if received.len() >= count {
                return received;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {} host messages, got {:?}", count, self.received());
    }
}
