//! Like / dislike toggles.

use std::sync::Arc;

use async_trait::async_trait;

use crate::action::{Action, ActionHandle};
use crate::error::PluginError;
use crate::store::Topic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Like,
    Dislike,
}

pub struct RatingToggle {
    handle: Arc<ActionHandle>,
    rating: Rating,
}

impl RatingToggle {
    pub fn like(handle: Arc<ActionHandle>) -> Arc<dyn Action> {
        Arc::new(Self {
            handle,
            rating: Rating::Like,
        })
    }

    pub fn dislike(handle: Arc<ActionHandle>) -> Arc<dyn Action> {
        Arc::new(Self {
            handle,
            rating: Rating::Dislike,
        })
    }
}

/// `on` / `off` image plus button state; `active` is `None` while disconnected.
pub fn rating_image(rating: Rating, style: &str, active: Option<bool>) -> (String, Option<u8>) {
    let base = match rating {
        Rating::Like => "btn_yandex_music_like",
        Rating::Dislike => "btn_yandex_music_dislike",
    };
    match active {
        None => (format!("{}_{}_off_loading.png", base, style), None),
        Some(on) => (
            format!("{}_{}_{}.png", base, style, if on { "on" } else { "off" }),
            Some(u8::from(on)),
        ),
    }
}

#[async_trait]
impl Action for RatingToggle {
    fn handle(&self) -> &Arc<ActionHandle> {
        &self.handle
    }

    fn topics(&self) -> &'static [Topic] {
        match self.rating {
            Rating::Like => &[Topic::Like],
            Rating::Dislike => &[Topic::Dislike],
        }
    }

    async fn render(&self) -> Result<(), PluginError> {
        let settings = self.handle.settings();
        let state = self.handle.store().snapshot();
        let (style, active) = match self.rating {
            Rating::Like => (settings.like_style, state.liked),
            Rating::Dislike => (settings.dislike_style, state.disliked),
        };
        let (image, button_state) = rating_image(self.rating, &style, state.connected.then_some(active));
        if let Some(button_state) = button_state {
            self.handle.set_state(button_state)?;
        }
        self.handle.set_image(&image).await
    }

    async fn key_down(&self) -> Result<(), PluginError> {
        match self.rating {
            Rating::Like => self.handle.player().toggle_like().await?,
            Rating::Dislike => self.handle.player().toggle_dislike().await?,
        };
        Ok(())
    }
}
