//! Per-button runtime.
//!
//! Every visible button is an [`Action`] instance bound to one host context.
//! The shared pieces (host queue, media store, commands, images) travel in an
//! [`ActionEnv`]; the per-context bits (settings, what is currently shown)
//! live in an [`ActionHandle`].

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use ymdeck_protocols::{
    ActionKind, ButtonSettings, InspectorMessage, LocalStatus, OutboundMessage,
};

use crate::assets::Assets;
use crate::clipboard::Clipboard;
use crate::error::PluginError;
use crate::host::HostSender;
use crate::player::MediaControl;
use crate::store::{MediaEvent, MediaStore, Topic};

/// Services shared by every action.
pub struct ActionEnv {
    pub host: HostSender,
    pub store: Arc<MediaStore>,
    pub player: MediaControl,
    pub assets: Arc<Assets>,
    pub clipboard: Arc<dyn Clipboard>,
}

/// Last values sent to the host, so unchanged renders cost nothing.
#[derive(Debug, Default)]
struct Shown {
    image: Option<String>,
    title: Option<String>,
    state: Option<u8>,
}

/// One button on the deck.
pub struct ActionHandle {
    kind: ActionKind,
    context: String,
    settings: RwLock<ButtonSettings>,
    shown: Mutex<Shown>,
    env: Arc<ActionEnv>,
}

impl ActionHandle {
    pub fn new(kind: ActionKind, context: &str, settings: ButtonSettings, env: Arc<ActionEnv>) -> Self {
        Self {
            kind,
            context: context.to_string(),
            settings: RwLock::new(settings),
            shown: Mutex::new(Shown::default()),
            env,
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn env(&self) -> &Arc<ActionEnv> {
        &self.env
    }

    pub fn store(&self) -> &MediaStore {
        &self.env.store
    }

    pub fn player(&self) -> &MediaControl {
        &self.env.player
    }

    pub fn settings(&self) -> ButtonSettings {
        self.settings.read().clone()
    }

    pub fn replace_settings(&self, settings: ButtonSettings) {
        *self.settings.write() = settings;
        self.invalidate();
    }

    /// Overlay `patch` on the current settings and return the result.
    pub fn merge_settings(&self, patch: &Map<String, Value>) -> ButtonSettings {
        let merged = {
            let mut settings = self.settings.write();
            settings.merge(patch);
            settings.clone()
        };
        self.invalidate();
        merged
    }

    /// Write the current settings back to the host.
    pub fn persist_settings(&self) -> Result<(), PluginError> {
        let settings = self.settings().to_value();
        self.send(OutboundMessage::set_settings(&self.context, settings))
    }

    /// Forget what was sent so the next render repaints everything. Needed
    /// whenever the host may have changed the button on its own (key press
    /// on a two-state button, wake from sleep, new settings).
    pub fn invalidate(&self) {
        *self.shown.lock() = Shown::default();
    }

    fn send(&self, message: OutboundMessage) -> Result<(), PluginError> {
        Ok(self.env.host.send(message)?)
    }

    /// Show a static image from the plugin's image directory.
    pub async fn set_image(&self, name: &str) -> Result<(), PluginError> {
        if self.shown.lock().image.as_deref() == Some(name) {
            return Ok(());
        }
        let uri = self.env.assets.static_image(name).await?;
        self.set_image_uri(name, &uri)
    }

    /// Show an already encoded image. `key` identifies it for change detection.
    pub fn set_image_uri(&self, key: &str, uri: &str) -> Result<(), PluginError> {
        {
            let mut shown = self.shown.lock();
            if shown.image.as_deref() == Some(key) {
                return Ok(());
            }
            shown.image = Some(key.to_string());
        }
        self.send(OutboundMessage::set_image(&self.context, uri, None))
    }

    pub fn set_title(&self, title: &str) -> Result<(), PluginError> {
        {
            let mut shown = self.shown.lock();
            if shown.title.as_deref() == Some(title) {
                return Ok(());
            }
            shown.title = Some(title.to_string());
        }
        self.send(OutboundMessage::set_title(&self.context, title))
    }

    pub fn set_state(&self, state: u8) -> Result<(), PluginError> {
        {
            let mut shown = self.shown.lock();
            if shown.state == Some(state) {
                return Ok(());
            }
            shown.state = Some(state);
        }
        self.send(OutboundMessage::set_state(&self.context, state))
    }

    pub fn show_ok(&self) -> Result<(), PluginError> {
        self.send(OutboundMessage::show_ok(&self.context))
    }

    pub fn show_alert(&self) -> Result<(), PluginError> {
        self.send(OutboundMessage::show_alert(&self.context))
    }

    pub fn send_to_inspector(&self, message: &InspectorMessage) -> Result<(), PluginError> {
        self.send(OutboundMessage::send_to_property_inspector(
            &self.kind.uuid(),
            &self.context,
            message.to_value(),
        ))
    }

    /// Tell this button's inspector whether the player is reachable.
    pub fn send_local_status(&self) -> Result<(), PluginError> {
        let status = LocalStatus::from_connected(self.store().is_connected());
        self.send_to_inspector(&InspectorMessage::LocalStatus { status })
    }
}

/// Button behaviour.
#[async_trait]
pub trait Action: Send + Sync {
    fn handle(&self) -> &Arc<ActionHandle>;

    /// Store groups, besides the connection flag, that trigger a render.
    fn topics(&self) -> &'static [Topic] {
        &[]
    }

    async fn render(&self) -> Result<(), PluginError>;

    async fn key_down(&self) -> Result<(), PluginError> {
        Ok(())
    }

    async fn key_up(&self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Called once the button is on screen, before the first render.
    async fn will_appear(&self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Stop background work. The instance is dropped afterwards.
    async fn will_disappear(&self) {}

    fn follows(&self, topic: Topic) -> bool {
        topic == Topic::Connection || self.topics().contains(&topic)
    }
}

/// Render and report the link status to the inspector.
pub async fn refresh(action: &dyn Action) -> Result<(), PluginError> {
    action.render().await?;
    action.handle().send_local_status()
}

/// Re-render `action` on every store event it follows until the store or
/// the task goes away.
pub fn observe(action: Arc<dyn Action>, mut events: broadcast::Receiver<MediaEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let result = match events.recv().await {
                Ok(event) if !action.follows(event.topic()) => continue,
                Ok(MediaEvent::Connection(_)) => refresh(action.as_ref()).await,
                Ok(_) => action.render().await,
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Action fell behind the store");
                    refresh(action.as_ref()).await
                }
                Err(RecvError::Closed) => break,
            };
            if let Err(e) = result {
                warn!(context = %action.handle().context(), error = %e, "Render failed");
            }
        }
    })
}

/// A restartable background task owned by an action.
#[derive(Debug, Default)]
pub struct TaskSlot {
    task: Mutex<Option<JoinHandle<()>>>,
}

impl TaskSlot {
    /// Start `future`, cancelling whatever ran in this slot before.
    pub fn start<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let previous = self.task.lock().replace(tokio::spawn(future));
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    pub fn cancel(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.lock().as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for TaskSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
