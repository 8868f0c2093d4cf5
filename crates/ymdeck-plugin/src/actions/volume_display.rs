//! Current volume as a percentage title over a level icon.

use std::sync::Arc;

use async_trait::async_trait;

use crate::action::{Action, ActionHandle};
use crate::error::PluginError;
use crate::store::Topic;

pub struct VolumeDisplay {
    handle: Arc<ActionHandle>,
}

impl VolumeDisplay {
    pub fn create(handle: Arc<ActionHandle>) -> Arc<dyn Action> {
        Arc::new(Self { handle })
    }
}

/// Icon variant: `0` silent, `1` for 1..=29 %, `2` above.
pub fn level_variant(percent: u8) -> u8 {
    match percent {
        0 => 0,
        1..=29 => 1,
        _ => 2,
    }
}

#[async_trait]
impl Action for VolumeDisplay {
    fn handle(&self) -> &Arc<ActionHandle> {
        &self.handle
    }

    fn topics(&self) -> &'static [Topic] {
        &[Topic::Volume]
    }

    async fn render(&self) -> Result<(), PluginError> {
        let style = self.handle.settings().volume_style;
        let state = self.handle.store().snapshot();
        if !state.connected {
            return self
                .handle
                .set_image(&format!("btn_yandex_music_vol_level_{}_0_loading.png", style))
                .await;
        }
        let percent = state.volume.current;
        let image = format!("btn_yandex_music_vol_level_{}_{}.png", style, level_variant(percent));
        self.handle.set_image(&image).await?;
        self.handle.set_title(&format!("{}%", percent))
    }
}
