//! Player commands.
//!
//! Reported states are predictions from the control's state before the click;
//! the page reacts asynchronously and the notifier picks up the real result.

use tracing::{debug, info};

use crate::controller::PlayerController;
use crate::dom::NodeRef;
use crate::error::{Control, PlayerError};
use crate::resolver::ElementKey;
use crate::selectors::SelectorChain;
use crate::signals;

/// Step applied by [`VolumeAction::Up`] and [`VolumeAction::Down`].
pub const VOLUME_STEP: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeAction {
    Up,
    Down,
    /// Absolute level in percent.
    Set(f64),
    Mute,
}

/// Result of a successful command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    PlayPause { is_playing: bool },
    Skipped,
    PrevClicked,
    Like { liked: bool },
    Dislike { disliked: bool },
    /// New level in percent.
    Volume { volume: u8 },
    Mute { is_muted: bool },
}

impl PlayerController {
    /// Toggle playback.
    pub async fn play_pause(&self) -> Result<CommandOutcome, PlayerError> {
        let result = self.try_play_pause().await;
        self.release_transient().await;
        result
    }

    pub async fn next(&self) -> Result<CommandOutcome, PlayerError> {
        let result = self
            .click_simple(ElementKey::NextButton, Control::Next, &self.selectors.next)
            .await
            .map(|_| CommandOutcome::Skipped);
        self.release_transient().await;
        result
    }

    pub async fn prev(&self) -> Result<CommandOutcome, PlayerError> {
        let result = self
            .click_simple(ElementKey::PrevButton, Control::Prev, &self.selectors.prev)
            .await
            .map(|_| CommandOutcome::PrevClicked);
        self.release_transient().await;
        result
    }

    pub async fn toggle_like(&self) -> Result<CommandOutcome, PlayerError> {
        let result = self
            .toggle(ElementKey::LikeButton, Control::Like, &self.selectors.like)
            .await
            .map(|liked| CommandOutcome::Like { liked });
        self.release_transient().await;
        result
    }

    pub async fn toggle_dislike(&self) -> Result<CommandOutcome, PlayerError> {
        let result = self
            .toggle(ElementKey::DislikeButton, Control::Dislike, &self.selectors.dislike)
            .await
            .map(|disliked| CommandOutcome::Dislike { disliked });
        self.release_transient().await;
        result
    }

    /// Step, set or mute the volume.
    pub async fn change_volume(&self, action: VolumeAction) -> Result<CommandOutcome, PlayerError> {
        let result = self.try_change_volume(action).await;
        self.release_transient().await;
        result
    }

    async fn try_play_pause(&self) -> Result<CommandOutcome, PlayerError> {
        let root = self.player_root().await?;
        let button = self
            .resolver
            .resolve_button(ElementKey::PlayButton, &root, &self.selectors.play_pause)
            .await?;
        let button = self.usable(button, Control::PlayPause).await?;

        let dom = self.dom();
        let class_name = dom.class_name(&button).await?;
        let test_id = dom.attribute(&button, "data-test-id").await?;
        let was_playing = signals::shows_pause(&class_name, test_id.as_deref());

        dom.click(&button).await?;
        info!(was_playing, "Play/pause clicked");
        Ok(CommandOutcome::PlayPause {
            is_playing: !was_playing,
        })
    }

    async fn click_simple(
        &self,
        key: ElementKey,
        control: Control,
        chain: &SelectorChain,
    ) -> Result<(), PlayerError> {
        let root = self.player_root().await?;
        let button = self.resolver.resolve_button(key, &root, chain).await?;
        let button = self.usable(button, control).await?;
        self.dom().click(&button).await?;
        info!(%control, "Clicked");
        Ok(())
    }

    /// Click a toggle button and return its predicted new state.
    async fn toggle(
        &self,
        key: ElementKey,
        control: Control,
        chain: &SelectorChain,
    ) -> Result<bool, PlayerError> {
        let root = self.player_root().await?;
        let button = self.resolver.resolve_button(key, &root, chain).await?;
        let button = self.usable(button, control).await?;
        let was_active = self.is_active(Some(&button)).await?;
        self.dom().click(&button).await?;
        info!(%control, active = !was_active, "Toggled");
        Ok(!was_active)
    }

    async fn try_change_volume(&self, action: VolumeAction) -> Result<CommandOutcome, PlayerError> {
        let scope = self.volume_scope().await?;
        let target = match action {
            VolumeAction::Mute => return self.toggle_mute(&scope).await,
            VolumeAction::Set(percent) => percent / 100.0,
            VolumeAction::Up | VolumeAction::Down => {
                let current = f64::from(self.volume_state(&scope).await?.current) / 100.0;
                if action == VolumeAction::Up {
                    current + VOLUME_STEP
                } else {
                    current - VOLUME_STEP
                }
            }
        };
        self.set_volume(&scope, target).await
    }

    async fn set_volume(&self, scope: &NodeRef, target: f64) -> Result<CommandOutcome, PlayerError> {
        let fraction = signals::clamp_fraction(target);
        let reported = CommandOutcome::Volume {
            volume: (fraction * 100.0).round() as u8,
        };

        if let Some(host) = &self.host {
            match host.set_volume(fraction).await {
                Ok(true) => {
                    info!(fraction, "Volume set through host API");
                    return Ok(reported);
                }
                Ok(false) => {}
                Err(e) => debug!(error = %e, "Host setVolume failed, using slider"),
            }
        }

        let slider = self
            .resolver
            .resolve(ElementKey::VolumeSlider, scope, &self.selectors.volume_slider)
            .await?;
        let slider = self.usable(slider, Control::Volume).await?;

        let dom = self.dom();
        let max = signals::parse_number(dom.property(&slider, "max").await?.as_deref())
            .filter(|max| *max > 1.0);
        let value = match max {
            Some(max) => ((fraction * max) * 100.0).round() / 100.0,
            None => fraction,
        };
        dom.set_input_value(&slider, &value.to_string()).await?;
        info!(fraction, "Volume set through slider");
        Ok(reported)
    }

    async fn toggle_mute(&self, scope: &NodeRef) -> Result<CommandOutcome, PlayerError> {
        let was_muted = self.volume_state(scope).await?.is_muted;

        if let Some(host) = &self.host {
            match host.toggle_mute().await {
                Ok(true) => {
                    info!(muted = !was_muted, "Mute toggled through host API");
                    return Ok(CommandOutcome::Mute {
                        is_muted: !was_muted,
                    });
                }
                Ok(false) => {}
                Err(e) => debug!(error = %e, "Host toggleMute failed, clicking button"),
            }
        }

        let button = self
            .resolver
            .resolve_button(ElementKey::MuteButton, scope, &self.selectors.mute_button)
            .await?;
        let button = self.usable(button, Control::Mute).await?;
        self.dom().click(&button).await?;
        info!(muted = !was_muted, "Mute button clicked");
        Ok(CommandOutcome::Mute {
            is_muted: !was_muted,
        })
    }

    /// The control if it exists and is enabled.
    async fn usable(&self, node: Option<NodeRef>, control: Control) -> Result<NodeRef, PlayerError> {
        let node = node.ok_or(PlayerError::ControlUnavailable(control))?;
        if self.dom().is_disabled(&node).await? {
            return Err(PlayerError::ControlUnavailable(control));
        }
        Ok(node)
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
