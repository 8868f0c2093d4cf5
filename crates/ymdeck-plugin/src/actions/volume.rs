//! Volume up / down with key-held auto-repeat.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};
use ymdeck_player::VolumeAction;

use crate::action::{Action, ActionHandle, TaskSlot};
use crate::error::PluginError;

/// Hold time before repeating starts is `REPEAT_DELAY_TICKS * REPEAT_INTERVAL`.
pub const REPEAT_INTERVAL: Duration = Duration::from_millis(100);
pub const REPEAT_DELAY_TICKS: u32 = 5;

pub struct VolumeStep {
    handle: Arc<ActionHandle>,
    action: VolumeAction,
    pressed: Arc<AtomicBool>,
    repeat: TaskSlot,
}

impl VolumeStep {
    pub fn up(handle: Arc<ActionHandle>) -> Arc<dyn Action> {
        Arc::new(Self::new(handle, VolumeAction::Up))
    }

    pub fn down(handle: Arc<ActionHandle>) -> Arc<dyn Action> {
        Arc::new(Self::new(handle, VolumeAction::Down))
    }

    pub(crate) fn new(handle: Arc<ActionHandle>, action: VolumeAction) -> Self {
        Self {
            handle,
            action,
            pressed: Arc::new(AtomicBool::new(false)),
            repeat: TaskSlot::default(),
        }
    }

    fn glyph(&self) -> &'static str {
        match self.action {
            VolumeAction::Down => "vol_down",
            _ => "vol_up",
        }
    }

    fn release(&self) {
        self.pressed.store(false, Ordering::SeqCst);
        self.repeat.cancel();
    }
}

async fn repeat_while_pressed(handle: Arc<ActionHandle>, action: VolumeAction, pressed: Arc<AtomicBool>) {
    for _ in 0..REPEAT_DELAY_TICKS {
        if !pressed.load(Ordering::SeqCst) {
            return;
        }
        tokio::time::sleep(REPEAT_INTERVAL).await;
    }
    debug!(context = %handle.context(), "Volume auto-repeat");
    while pressed.load(Ordering::SeqCst) {
        if let Err(e) = handle.player().change_volume(action).await {
            warn!(error = %e, "Volume repeat stopped");
            return;
        }
        tokio::time::sleep(REPEAT_INTERVAL).await;
    }
}

#[async_trait]
impl Action for VolumeStep {
    fn handle(&self) -> &Arc<ActionHandle> {
        &self.handle
    }

    async fn render(&self) -> Result<(), PluginError> {
        let style = self.handle.settings().volume_style;
        let suffix = if self.handle.store().is_connected() { "" } else { "_loading" };
        let image = format!("btn_yandex_music_{}_{}{}.png", self.glyph(), style, suffix);
        self.handle.set_image(&image).await
    }

    async fn key_down(&self) -> Result<(), PluginError> {
        self.pressed.store(true, Ordering::SeqCst);
        if let Err(e) = self.handle.player().change_volume(self.action).await {
            self.release();
            return Err(e);
        }
        self.repeat.start(repeat_while_pressed(
            self.handle.clone(),
            self.action,
            self.pressed.clone(),
        ));
        Ok(())
    }

    async fn key_up(&self) -> Result<(), PluginError> {
        self.release();
        Ok(())
    }

    async fn will_disappear(&self) {
        self.release();
    }
}

#[cfg(test)]
impl VolumeStep {
    pub(crate) fn is_repeating(&self) -> bool {
        self.repeat.is_running()
    }
}
