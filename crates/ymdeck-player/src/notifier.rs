//! Polling change notifier.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::controller::PlayerController;
use crate::diff::deep_diff;
use crate::error::PlayerError;

/// Receiver of encoded updates. Delivery never blocks and never fails from
/// the notifier's point of view; a sink that cannot take the message drops it.
pub trait NotifySink: Send + Sync {
    fn deliver(&self, message: String);
}

impl NotifySink for mpsc::UnboundedSender<String> {
    fn deliver(&self, message: String) {
        if self.send(message).is_err() {
            trace!("Update receiver closed, dropping message");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateKind {
    FullState,
    Delta,
}

/// Wire form of an update: `{"type": "FULL_STATE" | "DELTA", "payload": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerUpdate {
    #[serde(rename = "type")]
    pub kind: UpdateKind,
    pub payload: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverState {
    Idle,
    Observing,
}

/// Default polling interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

/// Polls the controller and reports what changed since the last emission.
///
/// The first emission after [`start_observation`](Self::start_observation) or
/// [`force_sync`](Self::force_sync) is a `FULL_STATE`; later ones are `DELTA`s
/// holding only changed or added keys.
pub struct ChangeNotifier {
    controller: Arc<PlayerController>,
    sink: Option<Arc<dyn NotifySink>>,
    interval: Duration,
    observing: AtomicBool,
    /// Bumped on every start so a loop from an earlier start exits.
    generation: AtomicU64,
    baseline: Mutex<Option<Value>>,
}

impl ChangeNotifier {
    pub fn new(controller: Arc<PlayerController>, sink: Option<Arc<dyn NotifySink>>) -> Self {
        Self {
            controller,
            sink,
            interval: DEFAULT_INTERVAL,
            observing: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            baseline: Mutex::new(None),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn controller(&self) -> &Arc<PlayerController> {
        &self.controller
    }

    pub fn state(&self) -> ObserverState {
        if self.observing.load(Ordering::SeqCst) {
            ObserverState::Observing
        } else {
            ObserverState::Idle
        }
    }

    /// Spawn the polling loop. Returns `false` if already observing.
    ///
    /// Must be called within a tokio runtime.
    pub fn start_observation(self: &Arc<Self>) -> bool {
        if self.observing.swap(true, Ordering::SeqCst) {
            return false;
        }
        *self.baseline.lock() = None;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!(interval_ms = self.interval.as_millis() as u64, "Observation started");

        let this = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                if !this.observing.load(Ordering::SeqCst)
                    || this.generation.load(Ordering::SeqCst) != generation
                {
                    break;
                }
                this.tick().await;
                tokio::time::sleep(this.interval).await;
            }
            debug!(generation, "Observation loop exited");
        });
        true
    }

    /// Stop polling. A tick already in flight still completes.
    pub fn stop_observation(&self) {
        if self.observing.swap(false, Ordering::SeqCst) {
            info!("Observation stopped");
        }
    }

    /// Forget the baseline so the next emission is a `FULL_STATE`. When idle,
    /// extracts and emits it right away.
    pub async fn force_sync(&self) {
        *self.baseline.lock() = None;
        if self.observing.load(Ordering::SeqCst) {
            debug!("Full state scheduled for next tick");
            return;
        }
        self.tick().await;
    }

    /// One extract, diff and notify pass. Returns the kind of update emitted,
    /// if any.
    pub async fn tick(&self) -> Option<UpdateKind> {
        let snapshot = match self.controller.get_full_state().await {
            Ok(snapshot) => snapshot,
            Err(PlayerError::ContainerNotFound) => {
                trace!("Player bar not on page, skipping tick");
                return None;
            }
            Err(e) => {
                debug!(error = %e, "Extraction failed, skipping tick");
                return None;
            }
        };
        let current = match serde_json::to_value(&snapshot) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Failed to encode snapshot");
                return None;
            }
        };

        let update = {
            let mut baseline = self.baseline.lock();
            match baseline.take() {
                None => {
                    *baseline = Some(current.clone());
                    Some(PlayerUpdate {
                        kind: UpdateKind::FullState,
                        payload: current,
                    })
                }
                Some(previous) => match deep_diff(&previous, &current) {
                    Some(delta) => {
                        *baseline = Some(current);
                        Some(PlayerUpdate {
                            kind: UpdateKind::Delta,
                            payload: delta,
                        })
                    }
                    None => {
                        *baseline = Some(previous);
                        None
                    }
                },
            }
        }?;

        let kind = update.kind;
        self.emit(&update);
        Some(kind)
    }

    fn emit(&self, update: &PlayerUpdate) {
        let Some(sink) = &self.sink else {
            return;
        };
        match serde_json::to_string(update) {
            Ok(message) => sink.deliver(message),
            Err(e) => warn!(error = %e, "Failed to encode update"),
        }
    }
}

#[cfg(test)]
#[path = "notifier_tests.rs"]
mod tests;
