//! State extraction.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::dom::{Dom, NodeRef};
use crate::error::PlayerError;
use crate::host_api::HostApi;
use crate::resolver::{ElementKey, Resolver};
use crate::selectors::{PlayerSelectors, SelectorChain};
use crate::signals;
use crate::snapshot::{
    Progress, StateSnapshot, TrackInfo, TransportState, UNKNOWN, VolumeMethod, VolumeState,
};

/// Controller for one player page.
///
/// Owns the element cache. Reads go through the host API first where the
/// page offers the capability and fall back to scraping the player bar.
pub struct PlayerController {
    pub(crate) resolver: Resolver,
    pub(crate) host: Option<Arc<dyn HostApi>>,
    pub(crate) selectors: PlayerSelectors,
}

impl PlayerController {
    pub fn new(dom: Arc<dyn Dom>, selectors: PlayerSelectors) -> Self {
        Self {
            resolver: Resolver::new(dom),
            host: None,
            selectors,
        }
    }

    /// Attach the page's structured player API.
    pub fn with_host(mut self, host: Arc<dyn HostApi>) -> Self {
        self.host = Some(host);
        self
    }

    pub fn selectors(&self) -> &PlayerSelectors {
        &self.selectors
    }

    pub(crate) fn dom(&self) -> &Arc<dyn Dom> {
        self.resolver.dom()
    }

    /// Extract a snapshot and release the per-call page handles.
    pub async fn get_full_state(&self) -> Result<StateSnapshot, PlayerError> {
        let result = self.extract_state().await;
        self.release_transient().await;
        result
    }

    /// Read the whole player state.
    pub async fn extract_state(&self) -> Result<StateSnapshot, PlayerError> {
        let root = self.player_root().await?;
        let sel = &self.selectors;

        let title_el = self.resolver.find(&root, &sel.title).await?;
        let artist_el = self.resolver.find(&root, &sel.artist).await?;
        let like = self
            .resolver
            .resolve_button(ElementKey::LikeButton, &root, &sel.like)
            .await?;
        let dislike = self
            .resolver
            .resolve_button(ElementKey::DislikeButton, &root, &sel.dislike)
            .await?;
        let pause = self.resolver.find(&root, &sel.pause_indicator).await?;

        let cover = match self.resolver.find(&root, &sel.cover).await? {
            Some(img) => self
                .dom()
                .property(&img, "src")
                .await?
                .filter(|src| !src.is_empty())
                .map(|src| signals::upscale_cover(&src)),
            None => None,
        };

        let track = TrackInfo {
            id: self.resolve_track_id(&root, title_el.as_ref()).await?,
            title: self.text_or_unknown(title_el.as_ref()).await?,
            artist: self.text_or_unknown(artist_el.as_ref()).await?,
            cover,
        };
        let state = TransportState {
            playing: pause.is_some(),
            liked: self.is_active(like.as_ref()).await?,
            disliked: self.is_active(dislike.as_ref()).await?,
        };

        Ok(StateSnapshot {
            track,
            state,
            progress: self.progress_state(&root).await,
            volume: self.volume_state(&root).await?,
        })
    }

    /// The player bar, cached.
    pub(crate) async fn player_root(&self) -> Result<NodeRef, PlayerError> {
        let document = self.dom().document().await?;
        self.resolver
            .resolve(ElementKey::Root, &document, &self.selectors.scope)
            .await?
            .ok_or(PlayerError::ContainerNotFound)
    }

    /// Player bar if present, else the whole document.
    pub(crate) async fn volume_scope(&self) -> Result<NodeRef, PlayerError> {
        match self.player_root().await {
            Ok(root) => Ok(root),
            Err(PlayerError::ContainerNotFound) => Ok(self.dom().document().await?),
            Err(e) => Err(e),
        }
    }

    pub(crate) async fn release_transient(&self) {
        if let Err(e) = self.dom().release_transient().await {
            trace!(error = %e, "Failed to release page handles");
        }
    }

    /// First track id found in the title link, the page URL, any track link in
    /// the bar, then the host API.
    async fn resolve_track_id(
        &self,
        root: &NodeRef,
        title: Option<&NodeRef>,
    ) -> Result<Option<String>, PlayerError> {
        let dom = self.dom();

        if let Some(title) = title {
            if let Some(id) = dom
                .property(title, "href")
                .await?
                .and_then(|href| signals::match_track_id(&href))
            {
                return Ok(Some(id));
            }
        }

        if let Some(id) = signals::match_track_id(&dom.location().await?) {
            return Ok(Some(id));
        }

        if let Some(link) = self.resolver.find(root, &self.selectors.track_link).await? {
            if let Some(id) = dom
                .property(&link, "href")
                .await?
                .and_then(|href| signals::match_track_id(&href))
            {
                return Ok(Some(id));
            }
        }

        if let Some(host) = &self.host {
            match host.current_track_id().await {
                Ok(Some(raw)) => return Ok(signals::match_track_id(&raw)),
                Ok(None) => {}
                Err(e) => debug!(error = %e, "Host track id unavailable"),
            }
        }

        Ok(None)
    }

    async fn text_or_unknown(&self, node: Option<&NodeRef>) -> Result<String, PlayerError> {
        let Some(node) = node else {
            return Ok(UNKNOWN.to_string());
        };
        let text = self.dom().text_content(node).await?.unwrap_or_default();
        let text = text.trim();
        Ok(if text.is_empty() {
            UNKNOWN.to_string()
        } else {
            text.to_string()
        })
    }

    /// Like/dislike active state. A missing button is inactive.
    pub(crate) async fn is_active(&self, button: Option<&NodeRef>) -> Result<bool, PlayerError> {
        let Some(button) = button else {
            return Ok(false);
        };
        let dom = self.dom();
        let pressed = dom.attribute(button, "aria-pressed").await?;
        if pressed.is_some() {
            return Ok(signals::is_toggle_active(pressed.as_deref(), "", None));
        }
        let class_name = dom.class_name(button).await?;
        if signals::class_marks_active(&class_name) {
            return Ok(true);
        }
        let icon = self.icon_href(button, &self.selectors.toggle_icon).await?;
        Ok(signals::is_toggle_active(None, &class_name, icon.as_deref()))
    }

    /// `xlink:href` (or `href`) of the first icon under `button`.
    async fn icon_href(
        &self,
        button: &NodeRef,
        chain: &SelectorChain,
    ) -> Result<Option<String>, PlayerError> {
        let Some(icon) = self.resolver.find(button, chain).await? else {
            return Ok(None);
        };
        let dom = self.dom();
        match dom.attribute(&icon, "xlink:href").await? {
            Some(href) => Ok(Some(href)),
            None => Ok(dom.attribute(&icon, "href").await?),
        }
    }

    /// Progress, degraded to zeros when the page cannot be read.
    async fn progress_state(&self, root: &NodeRef) -> Progress {
        match self.try_progress(root).await {
            Ok(progress) => progress,
            Err(e) => {
                debug!(error = %e, "Progress unreadable");
                Progress::default()
            }
        }
    }

    async fn try_progress(&self, root: &NodeRef) -> Result<Progress, PlayerError> {
        if let Some(host) = &self.host {
            let now = host.progress().await;
            let total = host.duration().await;
            match (now, total) {
                (Ok(Some(now)), Ok(Some(total))) => return Ok(Progress::new(now, total)),
                (Err(e), _) | (_, Err(e)) => {
                    debug!(error = %e, "Host progress unavailable, reading timeline")
                }
                _ => {}
            }
        }

        let dom = self.dom();
        let sel = &self.selectors;

        if let Some(slider) = self.resolver.find(root, &sel.timeline).await? {
            let value = signals::parse_number(dom.property(&slider, "value").await?.as_deref());
            let max = signals::parse_number(dom.property(&slider, "max").await?.as_deref());
            return Ok(Progress::new(value.unwrap_or(0.0), max.unwrap_or(0.0)));
        }

        let now = self.clock_text(root, &sel.time_now).await?;
        let total = self.clock_text(root, &sel.time_end).await?;
        Ok(Progress::new(
            signals::parse_clock(&now) as f64,
            signals::parse_clock(&total) as f64,
        ))
    }

    async fn clock_text(&self, root: &NodeRef, chain: &SelectorChain) -> Result<String, PlayerError> {
        let text = match self.resolver.find(root, chain).await? {
            Some(node) => self.dom().text_content(&node).await?,
            None => None,
        };
        Ok(text
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "0:00".to_string()))
    }

    /// Volume from the host API, else the volume slider.
    pub(crate) async fn volume_state(&self, scope: &NodeRef) -> Result<VolumeState, PlayerError> {
        if let Some(host) = &self.host {
            match host.volume().await {
                Ok(Some(volume)) => {
                    let is_muted = match host.is_muted().await {
                        Ok(Some(muted)) => muted,
                        Ok(None) => self.mute_signal(scope).await?,
                        Err(e) => {
                            debug!(error = %e, "Host mute state unavailable");
                            self.mute_signal(scope).await?
                        }
                    };
                    return Ok(VolumeState {
                        current: signals::to_percent(volume),
                        is_muted,
                        method: VolumeMethod::Api,
                    });
                }
                Ok(None) => {}
                Err(e) => debug!(error = %e, "Host volume unavailable, reading slider"),
            }
        }

        let slider = self
            .resolver
            .resolve(ElementKey::VolumeSlider, scope, &self.selectors.volume_slider)
            .await?;
        if let Some(slider) = slider {
            let dom = self.dom();
            let value = signals::parse_number(dom.property(&slider, "value").await?.as_deref());
            let max = signals::parse_number(dom.property(&slider, "max").await?.as_deref());
            return Ok(VolumeState {
                current: signals::slider_percent(value.unwrap_or(0.0), max.unwrap_or(1.0)),
                is_muted: self.mute_signal(scope).await?,
                method: VolumeMethod::Dom,
            });
        }

        Ok(VolumeState::default())
    }

    /// Mute state inferred from the mute button.
    async fn mute_signal(&self, scope: &NodeRef) -> Result<bool, PlayerError> {
        let button = self
            .resolver
            .resolve_button(ElementKey::MuteButton, scope, &self.selectors.mute_button)
            .await?;
        let Some(button) = button else {
            return Ok(false);
        };
        let icon = self.icon_href(&button, &self.selectors.mute_icon).await?;
        let class_name = self.dom().class_name(&button).await?;
        Ok(signals::is_muted(icon.as_deref(), &class_name))
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
