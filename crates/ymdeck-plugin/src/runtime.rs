//! Plugin process assembly.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use ymdeck_config::Config;
use ymdeck_inspector::TokenValidator;
use ymdeck_player_cdp::{LinkConfig, PlayerLink};

use crate::action::ActionEnv;
use crate::assets::Assets;
use crate::clipboard::SystemClipboard;
use crate::error::PluginError;
use crate::host::{HostConnection, HostSender, HostSettings};
use crate::player::MediaControl;
use crate::registry::ActionRegistry;
use crate::router::Router;
use crate::store::MediaStore;

/// Everything needed to start the plugin.
#[derive(Debug, Clone)]
pub struct PluginOptions {
    pub config: Config,
    pub host: HostSettings,
    /// The `.sdPlugin` directory holding `static/img`.
    pub plugin_dir: PathBuf,
}

/// Run the plugin until the host goes away or `cancel` fires.
///
/// Spawns the player link supervisor, the store feed and the router, then
/// drives the host connection on the current task.
pub async fn run_plugin(options: PluginOptions, cancel: CancellationToken) -> Result<(), PluginError> {
    let PluginOptions {
        config,
        host,
        plugin_dir,
    } = options;

    let (updates_tx, updates_rx) = mpsc::unbounded_channel::<String>();
    let link = Arc::new(PlayerLink::new(LinkConfig::from_config(&config), Arc::new(updates_tx)));
    let store = Arc::new(MediaStore::new());

    let feed = {
        let store = store.clone();
        let connected = link.subscribe();
        let cancel = cancel.child_token();
        tokio::spawn(async move { store.follow(updates_rx, connected, cancel).await })
    };
    let supervisor = tokio::spawn(link.clone().run(cancel.child_token()));

    let (sender, outbound) = HostSender::channel();
    let env = Arc::new(ActionEnv {
        host: sender,
        store: store.clone(),
        player: MediaControl::new(link.clone(), store),
        assets: Arc::new(Assets::new(&plugin_dir)),
        clipboard: Arc::new(SystemClipboard),
    });

    let mut router = Router::new(env, ActionRegistry::with_builtin());
    match TokenValidator::new(&config.token.check_url, config.token.timeout()) {
        Ok(validator) => router = router.with_token_validator(validator),
        Err(e) => warn!(error = %e, "Token checks disabled"),
    }
    let router = Arc::new(router);

    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let routing = tokio::spawn(router.clone().run(inbound_rx, cancel.child_token()));

    info!(plugin_dir = %plugin_dir.display(), "Plugin started");
    let result = HostConnection::new(host, outbound).run(inbound_tx, cancel.clone()).await;

    cancel.cancel();
    for task in [routing, supervisor, feed] {
        if let Err(e) = task.await {
            warn!(error = %e, "Plugin task ended abnormally");
        }
    }
    info!("Plugin stopped");
    Ok(result?)
}
