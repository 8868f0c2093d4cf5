//! Next / previous track.

use std::sync::Arc;

use async_trait::async_trait;

use crate::action::{Action, ActionHandle};
use crate::error::PluginError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipDirection {
    Next,
    Prev,
}

impl SkipDirection {
    fn glyph(&self) -> &'static str {
        match self {
            SkipDirection::Next => "next",
            SkipDirection::Prev => "prev",
        }
    }
}

pub struct Skip {
    handle: Arc<ActionHandle>,
    direction: SkipDirection,
}

impl Skip {
    pub fn next(handle: Arc<ActionHandle>) -> Arc<dyn Action> {
        Arc::new(Self {
            handle,
            direction: SkipDirection::Next,
        })
    }

    pub fn prev(handle: Arc<ActionHandle>) -> Arc<dyn Action> {
        Arc::new(Self {
            handle,
            direction: SkipDirection::Prev,
        })
    }
}

#[async_trait]
impl Action for Skip {
    fn handle(&self) -> &Arc<ActionHandle> {
        &self.handle
    }

    async fn render(&self) -> Result<(), PluginError> {
        let settings = self.handle.settings();
        let style = match self.direction {
            SkipDirection::Next => settings.next_style,
            SkipDirection::Prev => settings.prev_style,
        };
        let suffix = if self.handle.store().is_connected() { "" } else { "_loading" };
        let image = format!("btn_yandex_music_{}_{}{}.png", self.direction.glyph(), style, suffix);
        self.handle.set_image(&image).await
    }

    async fn key_down(&self) -> Result<(), PluginError> {
        match self.direction {
            SkipDirection::Next => self.handle.player().next().await?,
            SkipDirection::Prev => self.handle.player().prev().await?,
        };
        Ok(())
    }
}
