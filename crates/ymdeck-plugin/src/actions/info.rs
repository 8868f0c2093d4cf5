//! Now-playing button: cover art with title and artist; a press copies
//! "artist - title" to the clipboard.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use ymdeck_player::UNKNOWN;
use ymdeck_protocols::ButtonSettings;

use crate::action::{Action, ActionHandle};
use crate::assets::EMPTY_COVER;
use crate::error::PluginError;
use crate::store::{MediaState, Topic};

pub const WAITING_TITLE: &str = "Waiting...";

pub struct NowPlaying {
    handle: Arc<ActionHandle>,
}

impl NowPlaying {
    pub fn create(handle: Arc<ActionHandle>) -> Arc<dyn Action> {
        Arc::new(Self { handle })
    }

    async fn render_cover(&self, settings: &ButtonSettings, state: &MediaState) -> Result<(), PluginError> {
        let cover = state
            .track
            .cover_url
            .as_deref()
            .filter(|url| settings.show_cover && state.connected && !url.is_empty());
        if let Some(url) = cover {
            match self.handle.env().assets.cover(url).await {
                Ok(uri) => return self.handle.set_image_uri(url, &uri),
                Err(e) => warn!(url, error = %e, "Cover fetch failed"),
            }
        }
        self.handle.set_image(EMPTY_COVER).await
    }
}

/// Title text for the button, honoring the `show_*` flags.
pub fn info_title(settings: &ButtonSettings, state: &MediaState) -> String {
    if !state.connected {
        return WAITING_TITLE.to_string();
    }
    let mut lines = Vec::new();
    if settings.show_title {
        lines.push(state.track.title.as_str());
    }
    if settings.show_artist && !state.track.artist.is_empty() {
        lines.push(state.track.artist.as_str());
    }
    lines.join("\n")
}

/// Clipboard text, or `None` when there is no real track.
pub fn clipboard_text(state: &MediaState) -> Option<String> {
    let title = state.track.title.trim();
    if !state.connected || title.is_empty() || title == UNKNOWN {
        return None;
    }
    Some(format!("{} - {}", state.track.artist, title))
}

#[async_trait]
impl Action for NowPlaying {
    fn handle(&self) -> &Arc<ActionHandle> {
        &self.handle
    }

    fn topics(&self) -> &'static [Topic] {
        &[Topic::Track]
    }

    async fn render(&self) -> Result<(), PluginError> {
        let settings = self.handle.settings();
        let state = self.handle.store().snapshot();
        self.render_cover(&settings, &state).await?;
        self.handle.set_title(&info_title(&settings, &state))
    }

    async fn key_down(&self) -> Result<(), PluginError> {
        let Some(text) = clipboard_text(&self.handle.store().snapshot()) else {
            return Ok(());
        };
        match self.handle.env().clipboard.copy(&text).await {
            Ok(()) => {
                info!(%text, "Track copied");
                self.handle.show_ok()
            }
            Err(e) => {
                self.handle.show_alert()?;
                Err(e)
            }
        }
    }
}
