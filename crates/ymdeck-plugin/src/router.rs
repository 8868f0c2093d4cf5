//! Inbound event routing.
//!
//! Action events go to the instance bound to the event's context; a
//! `willAppear` for an unknown context creates the instance from the
//! registry, `willDisappear` drops it. Plugin-wide events (global settings,
//! wake-up, inspector requests) are handled here.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use ymdeck_inspector::TokenValidator;
use ymdeck_protocols::{
    ActionKind, ButtonSettings, EventKind, GlobalSettings, InboundEvent, InspectorMessage,
    OutboundMessage, PluginRequest, TokenStatus,
};

use crate::action::{Action, ActionEnv, ActionHandle, observe, refresh};
use crate::error::PluginError;
use crate::registry::ActionRegistry;

struct Instance {
    action: Arc<dyn Action>,
    observer: JoinHandle<()>,
}

impl Drop for Instance {
    fn drop(&mut self) {
        self.observer.abort();
    }
}

pub struct Router {
    env: Arc<ActionEnv>,
    registry: ActionRegistry,
    instances: DashMap<String, Instance>,
    globals: RwLock<GlobalSettings>,
    tokens: Option<TokenValidator>,
}

impl Router {
    pub fn new(env: Arc<ActionEnv>, registry: ActionRegistry) -> Self {
        Self {
            env,
            registry,
            instances: DashMap::new(),
            globals: RwLock::new(GlobalSettings::default()),
            tokens: None,
        }
    }

    pub fn with_token_validator(mut self, validator: TokenValidator) -> Self {
        self.tokens = Some(validator);
        self
    }

    pub fn global_settings(&self) -> GlobalSettings {
        self.globals.read().clone()
    }

    pub fn contexts(&self) -> Vec<String> {
        self.instances.iter().map(|e| e.key().clone()).collect()
    }

    pub fn action(&self, context: &str) -> Option<Arc<dyn Action>> {
        self.instances.get(context).map(|i| i.action.clone())
    }

    fn all_actions(&self) -> Vec<Arc<dyn Action>> {
        self.instances.iter().map(|e| e.value().action.clone()).collect()
    }

    /// Process inbound messages until `cancel` fires or the host side closes.
    pub async fn run(self: Arc<Self>, mut inbound: mpsc::UnboundedReceiver<String>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                message = inbound.recv() => match message {
                    Some(text) => self.handle_message(&text).await,
                    None => break,
                },
            }
        }
        self.shutdown().await;
    }

    /// Stop every instance's background work.
    pub async fn shutdown(&self) {
        let contexts = self.contexts();
        for context in contexts {
            if let Some((_, instance)) = self.instances.remove(&context) {
                instance.action.will_disappear().await;
            }
        }
        debug!("Router stopped");
    }

    /// Parse and dispatch one host message. Failures are logged, never fatal.
    pub async fn handle_message(&self, text: &str) {
        let event = match InboundEvent::parse(text) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Malformed host message");
                return;
            }
        };
        let name = event.event.clone();
        if let Err(e) = self.dispatch(event).await {
            warn!(event = %name, error = %e, "Event handler failed");
        }
    }

    pub async fn dispatch(&self, event: InboundEvent) -> Result<(), PluginError> {
        let Some(kind) = event.kind() else {
            trace!(event = %event.event, "Ignoring unknown event");
            return Ok(());
        };
        trace!(event = %kind, context = ?event.context, "Host event");
        if kind.is_action_event() {
            self.dispatch_action(kind, &event).await
        } else {
            self.dispatch_plugin(kind, &event).await
        }
    }

    async fn dispatch_action(&self, kind: EventKind, event: &InboundEvent) -> Result<(), PluginError> {
        let context = event.context()?;

        match kind {
            EventKind::WillAppear => return self.appear(context, event).await,
            EventKind::WillDisappear => {
                if let Some((_, instance)) = self.instances.remove(context) {
                    instance.action.will_disappear().await;
                    debug!(context, "Action removed");
                }
                return Ok(());
            }
            _ => {}
        }

        let Some(action) = self.action(context) else {
            debug!(event = %kind, context, "No action for context");
            return Ok(());
        };
        let handle = action.handle();

        match kind {
            EventKind::KeyDown => {
                // Two-state buttons flip on their own when pressed.
                handle.invalidate();
                let result = action.key_down().await;
                if result.is_err() {
                    let _ = action.render().await;
                }
                result
            }
            EventKind::KeyUp => action.key_up().await,
            EventKind::DidReceiveSettings => {
                handle.replace_settings(ButtonSettings::from_map(&event.settings()));
                refresh(action.as_ref()).await
            }
            EventKind::PropertyInspectorDidAppear => handle.send_local_status(),
            _ => Ok(()),
        }
    }

    async fn appear(&self, context: &str, event: &InboundEvent) -> Result<(), PluginError> {
        let settings = ButtonSettings::from_map(&event.settings());

        if let Some(action) = self.action(context) {
            action.handle().replace_settings(settings);
            return refresh(action.as_ref()).await;
        }

        let uuid = event.action.as_deref().unwrap_or_default();
        let kind = ActionKind::from_uuid(uuid)?;
        let handle = Arc::new(ActionHandle::new(kind, context, settings, self.env.clone()));
        let Some(action) = self.registry.create(handle) else {
            warn!(action = uuid, "No factory registered");
            return Ok(());
        };

        let observer = observe(action.clone(), self.env.store.subscribe());
        self.instances.insert(
            context.to_string(),
            Instance {
                action: action.clone(),
                observer,
            },
        );
        info!(action = %kind, context, "Action appeared");

        action.will_appear().await?;
        refresh(action.as_ref()).await
    }

    async fn dispatch_plugin(&self, kind: EventKind, event: &InboundEvent) -> Result<(), PluginError> {
        match kind {
            EventKind::DidReceiveGlobalSettings => {
                let globals = GlobalSettings::from_map(&event.settings());
                if let Some(port) = globals.local_port() {
                    self.env.player.source().set_port(port);
                }
                debug!(has_token = globals.token().is_some(), "Global settings received");
                *self.globals.write() = globals;
                Ok(())
            }
            EventKind::SystemDidWakeUp => {
                info!("System woke up");
                self.env.player.source().resync().await;
                self.repaint_all().await;
                Ok(())
            }
            EventKind::ApplicationDidLaunch => {
                info!(payload = ?event.payload, "Monitored application launched");
                self.env.player.source().resync().await;
                Ok(())
            }
            EventKind::ApplicationDidTerminate => {
                info!(payload = ?event.payload, "Monitored application terminated");
                Ok(())
            }
            EventKind::SendToPlugin => self.inspector_request(event).await,
            _ => Ok(()),
        }
    }

    async fn repaint_all(&self) {
        for action in self.all_actions() {
            action.handle().invalidate();
            if let Err(e) = refresh(action.as_ref()).await {
                warn!(context = %action.handle().context(), error = %e, "Refresh failed");
            }
        }
    }

    async fn inspector_request(&self, event: &InboundEvent) -> Result<(), PluginError> {
        let payload = event.payload.clone().unwrap_or(Value::Null);
        let Some(request) = PluginRequest::from_payload(&payload) else {
            debug!(?payload, "Ignoring inspector payload");
            return Ok(());
        };

        match request {
            PluginRequest::ApplySettingsToAll { settings } => {
                info!(keys = ?settings.keys().collect::<Vec<_>>(), "Applying settings to all actions");
                for action in self.all_actions() {
                    let handle = action.handle();
                    handle.merge_settings(&settings);
                    handle.persist_settings()?;
                    if let Err(e) = refresh(action.as_ref()).await {
                        warn!(context = %handle.context(), error = %e, "Refresh failed");
                    }
                }
                Ok(())
            }
            PluginRequest::CheckToken { token } => {
                let context = event.context()?;
                let status = self.check_token(&token).await;
                let action = event
                    .action
                    .clone()
                    .or_else(|| self.action(context).map(|a| a.handle().kind().uuid()))
                    .unwrap_or_default();
                let reply = InspectorMessage::TokenStatus { status };
                self.env.host.send(OutboundMessage::send_to_property_inspector(
                    &action,
                    context,
                    reply.to_value(),
                ))?;
                Ok(())
            }
        }
    }

    async fn check_token(&self, token: &str) -> TokenStatus {
        if token.trim().is_empty() {
            return TokenStatus::Missing;
        }
        let Some(validator) = &self.tokens else {
            return TokenStatus::Offline;
        };
        match validator.check(token).await {
            Ok(true) => TokenStatus::Valid,
            Ok(false) => TokenStatus::Invalid,
            Err(e) => {
                warn!(error = %e, "Token check failed");
                TokenStatus::Offline
            }
        }
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
