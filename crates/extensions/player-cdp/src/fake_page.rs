//! Scripted page socket for session-level tests.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

pub(crate) enum Reply {
    Result(Value),
    Error(i64, &'static str),
    /// Never answer.
    Silent,
}

enum Outgoing {
    Event(Value),
    Close,
}

/// One-connection WebSocket server answering CDP requests through `handler`.
pub(crate) struct FakePage {
    pub url: String,
    requests: Arc<Mutex<Vec<(String, Value)>>>,
    outgoing: mpsc::UnboundedSender<Outgoing>,
    _task: tokio::task::JoinHandle<()>,
}

impl FakePage {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&str, &Value) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}/devtools/page/fake", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let (outgoing, mut outgoing_rx) = mpsc::unbounded_channel();

        let log = requests.clone();
        let task = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            loop {
                tokio::select! {
                    msg = ws.next() => {
                        let Some(Ok(Message::Text(text))) = msg else { break };
                        let req: Value = serde_json::from_str(&text).unwrap();
                        let method = req["method"].as_str().unwrap_or_default().to_string();
                        let params = req.get("params").cloned().unwrap_or(Value::Null);
                        log.lock().push((method.clone(), params.clone()));
                        let body = match handler(&method, &params) {
                            Reply::Result(result) => json!({"id": req["id"], "result": result}),
                            Reply::Error(code, message) => {
                                json!({"id": req["id"], "error": {"code": code, "message": message}})
                            }
                            Reply::Silent => continue,
                        };
                        if ws.send(Message::Text(body.to_string().into())).await.is_err() {
                            break;
                        }
                    }
                    out = outgoing_rx.recv() => match out {
                        Some(Outgoing::Event(event)) => {
                            let _ = ws.send(Message::Text(event.to_string().into())).await;
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
            url,
            requests,
            outgoing,
            _task: task,
        }
    }

    pub fn push_event(&self, method: &str, params: Value) {
        let _ = self
            .outgoing
            .send(Outgoing::Event(json!({"method": method, "params": params})));
    }

    pub fn hang_up(&self) {
        let _ = self.outgoing.send(Outgoing::Close);
    }

    /// Params of every request for `method`, in order.
    pub fn requests(&self, method: &str) -> Vec<Value> {
        self.requests
            .lock()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, p)| p.clone())
            .collect()
    }
}
