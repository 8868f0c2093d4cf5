use std::sync::Arc;

use async_trait::async_trait;
use ymdeck_player::VolumeAction;

use crate::action::{Action, ActionHandle};
use crate::error::PluginError;
use crate::store::Topic;

pub struct Mute {
    handle: Arc<ActionHandle>,
}

impl Mute {
    pub fn create(handle: Arc<ActionHandle>) -> Arc<dyn Action> {
        Arc::new(Self { handle })
    }
}

#[async_trait]
impl Action for Mute {
    fn handle(&self) -> &Arc<ActionHandle> {
        &self.handle
    }

    fn topics(&self) -> &'static [Topic] {
        &[Topic::Volume]
    }

    async fn render(&self) -> Result<(), PluginError> {
        let style = self.handle.settings().mute_style;
        let state = self.handle.store().snapshot();
        let image = if state.connected {
            let flag = if state.volume.is_muted { "on" } else { "off" };
            format!("btn_yandex_music_mute_{}_{}.png", style, flag)
        } else {
            format!("btn_yandex_music_mute_{}_off_loading.png", style)
        };
        self.handle.set_image(&image).await
    }

    async fn key_down(&self) -> Result<(), PluginError> {
        self.handle.player().change_volume(VolumeAction::Mute).await?;
        Ok(())
    }
}
