//! Two-state play/pause button.

use std::sync::Arc;

use async_trait::async_trait;

use crate::action::{Action, ActionHandle};
use crate::error::PluginError;
use crate::store::Topic;

pub struct PlayPause {
    handle: Arc<ActionHandle>,
}

impl PlayPause {
    pub fn create(handle: Arc<ActionHandle>) -> Arc<dyn Action> {
        Arc::new(Self { handle })
    }
}

/// Image and button state for a playback state; `None` while disconnected.
///
/// State 1 shows the play glyph (paused), state 0 the pause glyph. Pause art
/// exists in two styles only.
pub fn play_pause_image(style: &str, playing: Option<bool>) -> (String, Option<u8>) {
    match playing {
        None => (format!("btn_yandex_music_play_{}_loading.png", style), None),
        Some(false) => (format!("btn_yandex_music_play_{}.png", style), Some(1)),
        Some(true) => {
            let pause_style = if matches!(style, "v1" | "v2") { "v1" } else { "v2" };
            (format!("btn_yandex_music_pause_{}.png", pause_style), Some(0))
        }
    }
}

#[async_trait]
impl Action for PlayPause {
    fn handle(&self) -> &Arc<ActionHandle> {
        &self.handle
    }

    fn topics(&self) -> &'static [Topic] {
        &[Topic::Playback]
    }

    async fn render(&self) -> Result<(), PluginError> {
        let style = self.handle.settings().play_style;
        let state = self.handle.store().snapshot();
        let playing = state.connected.then_some(state.playback.is_playing);
        let (image, button_state) = play_pause_image(&style, playing);
        if let Some(button_state) = button_state {
            self.handle.set_state(button_state)?;
        }
        self.handle.set_image(&image).await
    }

    async fn key_down(&self) -> Result<(), PluginError> {
        self.handle.player().play_pause().await?;
        Ok(())
    }
}
