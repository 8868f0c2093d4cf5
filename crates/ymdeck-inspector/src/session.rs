//! Headless property inspector.
//!
//! Speaks the inspector side of the host protocol: registers with the PI
//! uuid, pulls the button and plugin settings, keeps them current from host
//! events and writes changes back.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use ymdeck_protocols::{ActionInfo, InboundEvent, LaunchInfo, OutboundMessage, PluginRequest};

use crate::error::InspectorError;
use crate::state::{InspectorState, InspectorUpdate};
use crate::status::{Panel, panel_for_action};
use crate::token::{TokenCheck, TokenValidator};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const UPDATE_CAPACITY: usize = 32;

/// The arguments the host passes to a property inspector.
#[derive(Debug, Clone)]
pub struct InspectorLaunch {
    pub port: u16,
    /// The inspector's own uuid, used as its context.
    pub uuid: String,
    pub register_event: String,
    pub info: LaunchInfo,
    pub action_info: ActionInfo,
}

impl InspectorLaunch {
    pub fn url(&self) -> String {
        format!("ws://localhost:{}", self.port)
    }

    /// Context for global settings requests.
    pub fn plugin_uuid(&self) -> &str {
        self.info
            .plugin_uuid
            .as_deref()
            .unwrap_or(self.info.plugin.uuid.as_str())
    }
}

pub struct InspectorSession {
    launch: InspectorLaunch,
    state: Arc<RwLock<InspectorState>>,
    outbound: mpsc::UnboundedSender<OutboundMessage>,
    updates: broadcast::Sender<InspectorUpdate>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<Result<(), InspectorError>>>>,
}

impl InspectorSession {
    /// Connect, register and request both settings scopes.
    pub async fn connect(launch: InspectorLaunch) -> Result<Self, InspectorError> {
        let (mut socket, _) = tokio_tungstenite::connect_async(launch.url()).await?;
        info!(url = %launch.url(), action = %launch.action_info.action, "Inspector connected");

        for message in [
            OutboundMessage::register(&launch.register_event, &launch.uuid),
            OutboundMessage::get_settings(&launch.uuid),
            OutboundMessage::get_global_settings(launch.plugin_uuid()),
        ] {
            send(&mut socket, &message).await?;
        }

        let state = Arc::new(RwLock::new(InspectorState::from_action_info(&launch.action_info)));
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let (updates, _) = broadcast::channel(UPDATE_CAPACITY);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(pump(
            socket,
            outbound_rx,
            state.clone(),
            updates.clone(),
            cancel.clone(),
        ));

        Ok(Self {
            launch,
            state,
            outbound,
            updates,
            cancel,
            task: Mutex::new(Some(task)),
        })
    }

    pub fn launch(&self) -> &InspectorLaunch {
        &self.launch
    }

    pub fn state(&self) -> InspectorState {
        self.state.read().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<InspectorUpdate> {
        self.updates.subscribe()
    }

    pub fn panel(&self) -> Option<Panel> {
        panel_for_action(&self.launch.action_info.action)
    }

    fn send(&self, message: OutboundMessage) -> Result<(), InspectorError> {
        self.outbound.send(message).map_err(|_| InspectorError::Closed)
    }

    /// Change one button setting and write the whole set back.
    pub fn set_setting(&self, key: &str, value: Value) -> Result<(), InspectorError> {
        let settings = {
            let mut state = self.state.write();
            state.settings.insert(key.to_string(), value);
            state.settings.clone()
        };
        debug!(key, "Saving setting");
        self.send(OutboundMessage::set_settings(&self.launch.uuid, Value::Object(settings)))
    }

    fn save_global(&self) -> Result<(), InspectorError> {
        let global = self.state.read().global.to_value();
        self.send(OutboundMessage::set_global_settings(&self.launch.uuid, global))
    }

    /// Stored as typed, the plugin parses it.
    pub fn update_local_port(&self, port: &str) -> Result<(), InspectorError> {
        self.state.write().global.local_port = Some(Value::String(port.to_string()));
        self.save_global()
    }

    pub fn update_token(&self, token: &str) -> Result<(), InspectorError> {
        self.state.write().global.token = Some(token.to_string());
        self.save_global()
    }

    /// Validate `token` and save it only if the endpoint accepts it.
    pub async fn save_token(&self, validator: &TokenValidator, token: &str) -> Result<TokenCheck, InspectorError> {
        let token = token.trim();
        let result = validator.check(token).await;
        if let Err(e) = &result {
            warn!(error = %e, "Token validation failed");
        }
        let check = TokenCheck::from_result(&result);
        if check.should_save() {
            self.update_token(token)?;
        }
        Ok(check)
    }

    /// Ask the plugin to copy this button's control mode to every button.
    pub fn apply_mode_to_all(&self) -> Result<(), InspectorError> {
        let mode = self.state.read().control_mode();
        let mut settings = serde_json::Map::new();
        settings.insert("control_mode".to_string(), json!(mode.as_str()));
        let request = PluginRequest::ApplySettingsToAll { settings };
        self.send(OutboundMessage::send_to_plugin(
            Some(&self.launch.action_info.action),
            &self.launch.uuid,
            request.to_value(),
        ))
    }

    /// Ask the plugin to validate `token`; the answer arrives as a
    /// `TokenStatus` update.
    pub fn request_token_check(&self, token: &str) -> Result<(), InspectorError> {
        let request = PluginRequest::CheckToken {
            token: token.trim().to_string(),
        };
        self.send(OutboundMessage::send_to_plugin(
            Some(&self.launch.action_info.action),
            &self.launch.uuid,
            request.to_value(),
        ))
    }

    pub fn is_open(&self) -> bool {
        self.task.lock().as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Flush queued messages, close the socket and wait for the pump.
    pub async fn close(&self) -> Result<(), InspectorError> {
        self.cancel.cancel();
        let task = self.task.lock().take();
        match task {
            Some(task) => task.await.unwrap_or(Err(InspectorError::Closed)),
            None => Ok(()),
        }
    }
}

impl Drop for InspectorSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn pump(
    mut socket: Socket,
    mut outbound: mpsc::UnboundedReceiver<OutboundMessage>,
    state: Arc<RwLock<InspectorState>>,
    updates: broadcast::Sender<InspectorUpdate>,
    cancel: CancellationToken,
) -> Result<(), InspectorError> {
    loop {
        tokio::select! {
            biased;
            out = outbound.recv() => match out {
                Some(message) => send(&mut socket, &message).await?,
                None => break,
            },
            _ = cancel.cancelled() => break,
            msg = socket.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let event = match InboundEvent::parse(&text) {
                        Ok(event) => event,
                        Err(e) => {
                            warn!(error = %e, "Malformed host message");
                            continue;
                        }
                    };
                    trace!(event = %event.event, "Inspector event");
                    let update = state.write().apply(&event);
                    if let Some(update) = update {
                        let _ = updates.send(update);
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    debug!("Host closed the inspector connection");
                    return Ok(());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
            }
        }
    }
    let _ = socket.close(None).await;
    Ok(())
}

async fn send(socket: &mut Socket, message: &OutboundMessage) -> Result<(), InspectorError> {
    let json = message.to_json()?;
    socket.send(Message::Text(json.into())).await?;
    Ok(())
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
