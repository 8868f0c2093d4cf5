//! Commands from buttons to the player page.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use ymdeck_player::{CommandOutcome, PlayerController, VolumeAction};
use ymdeck_player_cdp::PlayerLink;

use crate::error::PluginError;
use crate::store::MediaStore;

/// Whatever currently holds a controller for the player page.
#[async_trait]
pub trait PlayerSource: Send + Sync {
    /// `None` while the page is not attached.
    fn controller(&self) -> Option<Arc<PlayerController>>;

    /// Point the source at another DevTools port.
    fn set_port(&self, _port: u16) {}

    /// Re-read the whole page state, reconnecting first if needed.
    async fn resync(&self) {}
}

#[async_trait]
impl PlayerSource for PlayerLink {
    fn controller(&self) -> Option<Arc<PlayerController>> {
        PlayerLink::controller(self)
    }

    fn set_port(&self, port: u16) {
        PlayerLink::set_port(self, port)
    }

    async fn resync(&self) {
        match self.notifier() {
            Some(notifier) => notifier.force_sync().await,
            None => {
                self.check().await;
            }
        }
    }
}

/// Runs commands and publishes their predicted results to the store.
#[derive(Clone)]
pub struct MediaControl {
    source: Arc<dyn PlayerSource>,
    store: Arc<MediaStore>,
}

impl MediaControl {
    pub fn new(source: Arc<dyn PlayerSource>, store: Arc<MediaStore>) -> Self {
        Self { source, store }
    }

    pub fn source(&self) -> &Arc<dyn PlayerSource> {
        &self.source
    }

    fn controller(&self) -> Result<Arc<PlayerController>, PluginError> {
        self.source.controller().ok_or(PluginError::NotConnected)
    }

    fn publish(&self, outcome: CommandOutcome) -> CommandOutcome {
        debug!(?outcome, "Command done");
        self.store.predict(&outcome);
        outcome
    }

    pub async fn play_pause(&self) -> Result<CommandOutcome, PluginError> {
        let outcome = self.controller()?.play_pause().await?;
        Ok(self.publish(outcome))
    }

    pub async fn next(&self) -> Result<CommandOutcome, PluginError> {
        let outcome = self.controller()?.next().await?;
        Ok(self.publish(outcome))
    }

    pub async fn prev(&self) -> Result<CommandOutcome, PluginError> {
        let outcome = self.controller()?.prev().await?;
        Ok(self.publish(outcome))
    }

    pub async fn toggle_like(&self) -> Result<CommandOutcome, PluginError> {
        let outcome = self.controller()?.toggle_like().await?;
        Ok(self.publish(outcome))
    }

    pub async fn toggle_dislike(&self) -> Result<CommandOutcome, PluginError> {
        let outcome = self.controller()?.toggle_dislike().await?;
        Ok(self.publish(outcome))
    }

    pub async fn change_volume(&self, action: VolumeAction) -> Result<CommandOutcome, PluginError> {
        let outcome = self.controller()?.change_volume(action).await?;
        Ok(self.publish(outcome))
    }
}
