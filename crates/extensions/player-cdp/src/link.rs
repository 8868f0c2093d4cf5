//! Connection supervisor for the player page.
//!
//! Every `reconnect_interval` the link checks its session; when there is none
//! (or the page went away) it discovers the player page, attaches, builds a
//! [`PlayerController`] over it and starts a [`ChangeNotifier`] that feeds the
//! shared sink. Connection changes are published on a `watch` channel.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use ymdeck_config::Config;
use ymdeck_player::{ChangeNotifier, NotifySink, PlayerController, PlayerSelectors};

use crate::cdp::{CdpClient, CdpError, PageSession};
use crate::dom::CdpDom;
use crate::host_api::CdpHostApi;

/// Link settings, usually taken from [`Config`].
#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub endpoint: String,
    pub page_match: Vec<String>,
    pub reconnect_interval: Duration,
    pub request_timeout: Duration,
    pub observer_interval: Duration,
    pub selectors: PlayerSelectors,
}

impl LinkConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            endpoint: config.cdp.endpoint.clone(),
            page_match: config.cdp.page_match.clone(),
            reconnect_interval: config.cdp.reconnect_interval(),
            request_timeout: config.cdp.request_timeout(),
            observer_interval: config.observer.interval(),
            selectors: PlayerSelectors::default().with_overrides(&config.selectors),
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

struct ActiveLink {
    page_id: String,
    session: Arc<PageSession>,
    notifier: Arc<ChangeNotifier>,
    /// Forwards page events; ends with the session.
    watcher: tokio::task::JoinHandle<()>,
}

/// Keeps one live controller attached to the player page.
pub struct PlayerLink {
    config: Mutex<LinkConfig>,
    sink: Arc<dyn NotifySink>,
    active: Mutex<Option<ActiveLink>>,
    connected: watch::Sender<bool>,
}

impl PlayerLink {
    pub fn new(config: LinkConfig, sink: Arc<dyn NotifySink>) -> Self {
        let (connected, _) = watch::channel(false);
        Self {
            config: Mutex::new(config),
            sink,
            active: Mutex::new(None),
            connected,
        }
    }

    /// Connection state; `true` while a controller is attached.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.connected.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    pub fn notifier(&self) -> Option<Arc<ChangeNotifier>> {
        self.active.lock().as_ref().map(|a| a.notifier.clone())
    }

    pub fn controller(&self) -> Option<Arc<PlayerController>> {
        self.notifier().map(|n| n.controller().clone())
    }

    pub fn endpoint(&self) -> String {
        self.config.lock().endpoint.clone()
    }

    /// Move the DevTools endpoint to another local port. A live session on the
    /// old endpoint is dropped so the next check reconnects.
    pub fn set_port(&self, port: u16) {
        let changed = {
            let mut config = self.config.lock();
            let Ok(mut url) = url::Url::parse(&config.endpoint) else {
                warn!(endpoint = %config.endpoint, "Cannot set port on endpoint");
                return;
            };
            if url.port_or_known_default() == Some(port) || url.set_port(Some(port)).is_err() {
                false
            } else {
                config.endpoint = url.as_str().trim_end_matches('/').to_string();
                true
            }
        };
        if changed {
            info!(port, "DevTools port changed");
            self.disconnect("endpoint changed");
        }
    }

    /// Supervise until `cancel` fires.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        info!(endpoint = %self.endpoint(), "Player link started");
        loop {
            self.check().await;
            let interval = self.config.lock().reconnect_interval;
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(interval) => {}
            }
        }
        self.disconnect("shutdown");
        info!("Player link stopped");
    }

    /// One supervision pass. Returns whether a controller is attached after it.
    pub async fn check(&self) -> bool {
        let healthy = self
            .active
            .lock()
            .as_ref()
            .map(|a| !a.session.is_closed());
        match healthy {
            Some(true) => return true,
            Some(false) => self.disconnect("page socket closed"),
            None => {}
        }

        match self.connect().await {
            Ok(active) => {
                info!(page = %active.page_id, "Attached to player page");
                *self.active.lock() = Some(active);
                self.connected.send_replace(true);
                true
            }
            Err(CdpError::EndpointUnavailable(endpoint)) => {
                debug!(%endpoint, "Desktop client not reachable");
                false
            }
            Err(e) => {
                debug!(error = %e, "Failed to attach to player page");
                false
            }
        }
    }

    async fn connect(&self) -> Result<ActiveLink, CdpError> {
        let config = self.config.lock().clone();
        let client = CdpClient::new(&config.endpoint, config.request_timeout)?;
        let page = client.find_page(&config.page_match).await?;
        let session = Arc::new(client.attach(&page).await?);

        let dom = Arc::new(CdpDom::new(session.clone()));
        let host = Arc::new(CdpHostApi::new(session.clone()));
        let controller = PlayerController::new(dom, config.selectors.clone()).with_host(host);
        let notifier = Arc::new(
            ChangeNotifier::new(Arc::new(controller), Some(self.sink.clone()))
                .with_interval(config.observer_interval),
        );
        notifier.start_observation();

        let watcher = match session.events() {
            Some(mut events) => {
                let notifier = notifier.clone();
                tokio::spawn(async move {
                    while let Some(event) = events.recv().await {
                        if event.is_context_reset() {
                            debug!(method = %event.method, "Page reloaded, resyncing");
                            notifier.force_sync().await;
                        }
                    }
                })
            }
            None => tokio::spawn(async {}),
        };

        Ok(ActiveLink {
            page_id: page.id,
            session,
            notifier,
            watcher,
        })
    }

    /// Tear down the current session, if any.
    pub fn disconnect(&self, reason: &str) {
        let Some(active) = self.active.lock().take() else {
            return;
        };
        info!(page = %active.page_id, reason, "Detached from player page");
        active.notifier.stop_observation();
        active.watcher.abort();
        let session = active.session;
        // Closing needs the runtime; without one the drop below still aborts
        // the receive loop.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move { session.close().await });
        }
        self.connected.send_replace(false);
    }
}

#[cfg(test)]
#[path = "link_tests.rs"]
mod tests;
