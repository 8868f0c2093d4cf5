//! Shared fixtures: a plugin environment over an in-memory player page.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;
use ymdeck_player::testing::{FakeDom, PlayerPage, player_page};
use ymdeck_player::{PlayerController, PlayerSelectors};
use ymdeck_protocols::{ActionKind, ButtonSettings, OutboundMessage};

use crate::action::{ActionEnv, ActionHandle};
use crate::assets::{Assets, EMPTY_COVER};
use crate::clipboard::Clipboard;
use crate::error::PluginError;
use crate::host::HostSender;
use crate::player::{MediaControl, PlayerSource};
use crate::store::MediaStore;

/// Source whose controller the test swaps in and out.
#[derive(Default)]
pub(crate) struct FixedSource {
    controller: Mutex<Option<Arc<PlayerController>>>,
    pub ports: Mutex<Vec<u16>>,
    pub resyncs: AtomicUsize,
}

impl FixedSource {
    pub fn set(&self, controller: Option<Arc<PlayerController>>) {
        *self.controller.lock() = controller;
    }
}

#[async_trait]
impl PlayerSource for FixedSource {
    fn controller(&self) -> Option<Arc<PlayerController>> {
        self.controller.lock().clone()
    }

    fn set_port(&self, port: u16) {
        self.ports.lock().push(port);
    }

    async fn resync(&self) {
        self.resyncs.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub(crate) struct RecordingClipboard {
    pub copied: Mutex<Vec<String>>,
    pub fail: std::sync::atomic::AtomicBool,
}

#[async_trait]
impl Clipboard for RecordingClipboard {
    async fn copy(&self, text: &str) -> Result<(), PluginError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PluginError::Clipboard("no tool".to_string()));
        }
        self.copied.lock().push(text.to_string());
        Ok(())
    }
}

/// Every static image name the actions can ask for.
fn image_names() -> Vec<String> {
    let mut names = vec![EMPTY_COVER.to_string()];
    for style in ["v1", "v2", "v3"] {
        for base in ["play", "pause", "prev", "next", "vol_up", "vol_down"] {
            names.push(format!("btn_yandex_music_{}_{}.png", base, style));
            names.push(format!("btn_yandex_music_{}_{}_loading.png", base, style));
        }
        for base in ["like", "dislike", "mute"] {
            for flag in ["on", "off"] {
                names.push(format!("btn_yandex_music_{}_{}_{}.png", base, style, flag));
                names.push(format!("btn_yandex_music_{}_{}_{}_loading.png", base, style, flag));
            }
        }
        for level in ["0", "1", "2"] {
            names.push(format!("btn_yandex_music_vol_level_{}_{}.png", style, level));
        }
        names.push(format!("btn_yandex_music_vol_level_{}_0_loading.png", style));
    }
    names
}

pub(crate) struct Harness {
    pub env: Arc<ActionEnv>,
    pub dom: Arc<FakeDom>,
    pub page: PlayerPage,
    pub controller: Arc<PlayerController>,
    pub source: Arc<FixedSource>,
    pub clipboard: Arc<RecordingClipboard>,
    outbound: mpsc::UnboundedReceiver<OutboundMessage>,
    _dir: tempfile::TempDir,
}

impl Harness {
    /// Environment with the player page built but not yet connected.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("static").join("img");
        std::fs::create_dir_all(&img).unwrap();
        for name in image_names() {
            // Each file holds its own name so tests can tell images apart.
            std::fs::write(img.join(&name), name.as_bytes()).unwrap();
        }

        let dom = Arc::new(FakeDom::new());
        let page = player_page(&dom);
        let controller = Arc::new(PlayerController::new(dom.clone(), PlayerSelectors::default()));
        let source = Arc::new(FixedSource::default());
        let store = Arc::new(MediaStore::new());
        let clipboard = Arc::new(RecordingClipboard::default());
        let (host, outbound) = HostSender::channel();

        let env = Arc::new(ActionEnv {
            host,
            store: store.clone(),
            player: MediaControl::new(source.clone(), store),
            assets: Arc::new(Assets::new(dir.path())),
            clipboard: clipboard.clone(),
        });

        Self {
            env,
            dom,
            page,
            controller,
            source,
            clipboard,
            outbound,
            _dir: dir,
        }
    }

    /// Attach the controller and load its state into the store.
    pub async fn connect(&self) {
        self.source.set(Some(self.controller.clone()));
        let snapshot = self.controller.get_full_state().await.unwrap();
        self.env.store.apply_full(&snapshot);
    }

    pub fn disconnect(&self) {
        self.source.set(None);
        self.env.store.set_connected(false);
    }

    pub fn handle(&self, kind: ActionKind) -> Arc<ActionHandle> {
        self.handle_with(kind, ButtonSettings::default())
    }

    pub fn handle_with(&self, kind: ActionKind, settings: ButtonSettings) -> Arc<ActionHandle> {
        Arc::new(ActionHandle::new(kind, "ctx", settings, self.env.clone()))
    }

    /// Messages queued for the host since the last call.
    pub fn sent(&mut self) -> Vec<OutboundMessage> {
        let mut sent = Vec::new();
        while let Ok(message) = self.outbound.try_recv() {
            sent.push(message);
        }
        sent
    }

    /// Wait for at least one message, then return everything queued.
    pub async fn next_sent(&mut self) -> Vec<OutboundMessage> {
        let first = tokio::time::timeout(Duration::from_secs(2), self.outbound.recv())
            .await
            .expect("no host message")
            .expect("host queue closed");
        let mut sent = vec![first];
        sent.extend(self.sent());
        sent
    }
}

/// Static image names in `setImage` messages, in order.
pub(crate) fn images(sent: &[OutboundMessage]) -> Vec<String> {
    sent.iter()
        .filter(|m| m.event == "setImage")
        .filter_map(|m| m.payload.as_ref()?.get("image")?.as_str().map(str::to_string))
        .map(|uri| match uri.strip_prefix("data:image/png;base64,") {
            Some(b64) => String::from_utf8(STANDARD.decode(b64).unwrap()).unwrap(),
            None => uri,
        })
        .collect()
}

pub(crate) fn titles(sent: &[OutboundMessage]) -> Vec<String> {
    payload_strings(sent, "setTitle", "title")
}

pub(crate) fn states(sent: &[OutboundMessage]) -> Vec<u64> {
    sent.iter()
        .filter(|m| m.event == "setState")
        .filter_map(|m| m.payload.as_ref()?.get("state")?.as_u64())
        .collect()
}

pub(crate) fn events(sent: &[OutboundMessage]) -> Vec<&str> {
    sent.iter().map(|m| m.event.as_str()).collect()
}

fn payload_strings(sent: &[OutboundMessage], event: &str, key: &str) -> Vec<String> {
    sent.iter()
        .filter(|m| m.event == event)
        .filter_map(|m| m.payload.as_ref()?.get(key).and_then(Value::as_str).map(str::to_string))
        .collect()
}
