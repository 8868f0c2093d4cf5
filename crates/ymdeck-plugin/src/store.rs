//! Plugin-side copy of the player state.
//!
//! The store is fed by the notifier's `FULL_STATE` / `DELTA` updates and by
//! command predictions, and broadcasts a [`MediaEvent`] for every group of
//! fields that changed. Actions render from [`MediaStore::snapshot`].

use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};
use ymdeck_player::{CommandOutcome, PlayerUpdate, StateSnapshot, UpdateKind};

/// How long a command's prediction wins over incoming deltas.
pub const OPTIMISTIC_WINDOW: Duration = Duration::from_secs(2);

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackState {
    pub track_id: Option<String>,
    pub title: String,
    pub artist: String,
    pub cover_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub current_sec: f64,
    pub total_sec: f64,
    pub progress: f64,
    /// When `current_sec` was last read from the page.
    pub updated_at: Option<Instant>,
}

impl PlaybackState {
    /// Position at `now`, advanced by the time elapsed since the last reading
    /// while playing and capped at the track length.
    pub fn position_at(&self, now: Instant) -> f64 {
        let mut position = self.current_sec;
        if self.is_playing {
            if let Some(at) = self.updated_at {
                position += now.saturating_duration_since(at).as_secs_f64();
            }
            if self.total_sec > 0.0 {
                position = position.min(self.total_sec);
            }
        }
        position.max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VolumeLevel {
    pub current: u8,
    pub is_muted: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaState {
    pub connected: bool,
    pub track: TrackState,
    pub playback: PlaybackState,
    pub liked: bool,
    pub disliked: bool,
    pub volume: VolumeLevel,
}

/// Field groups an action can follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Connection,
    Track,
    Playback,
    Like,
    Dislike,
    Volume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    Connection(bool),
    Track,
    Playback,
    Like,
    Dislike,
    Volume,
}

impl MediaEvent {
    pub fn topic(&self) -> Topic {
        match self {
            MediaEvent::Connection(_) => Topic::Connection,
            MediaEvent::Track => Topic::Track,
            MediaEvent::Playback => Topic::Playback,
            MediaEvent::Like => Topic::Like,
            MediaEvent::Dislike => Topic::Dislike,
            MediaEvent::Volume => Topic::Volume,
        }
    }
}

pub struct MediaStore {
    state: RwLock<MediaState>,
    events: broadcast::Sender<MediaEvent>,
    playback_hold: Mutex<Option<Instant>>,
    volume_hold: Mutex<Option<Instant>>,
}

impl MediaStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: RwLock::new(MediaState::default()),
            events,
            playback_hold: Mutex::new(None),
            volume_hold: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MediaEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> MediaState {
        self.state.read().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.state.read().connected
    }

    fn emit(&self, event: MediaEvent) {
        trace!(?event, "Media event");
        // No subscribers is fine: nothing is on screen yet.
        let _ = self.events.send(event);
    }

    fn held(hold: &Mutex<Option<Instant>>) -> bool {
        hold.lock().is_some_and(|until| Instant::now() < until)
    }

    pub fn set_connected(&self, connected: bool) {
        let changed = {
            let mut state = self.state.write();
            std::mem::replace(&mut state.connected, connected) != connected
        };
        if changed {
            debug!(connected, "Player connection changed");
            self.emit(MediaEvent::Connection(connected));
        }
    }

    /// Apply one encoded notifier message.
    pub fn apply_message(&self, message: &str) {
        match serde_json::from_str::<PlayerUpdate>(message) {
            Ok(update) => self.apply_update(&update),
            Err(e) => warn!(error = %e, "Undecodable player update"),
        }
    }

    pub fn apply_update(&self, update: &PlayerUpdate) {
        match update.kind {
            UpdateKind::FullState => match serde_json::from_value::<StateSnapshot>(update.payload.clone()) {
                Ok(snapshot) => self.apply_full(&snapshot),
                Err(e) => warn!(error = %e, "Malformed FULL_STATE payload"),
            },
            UpdateKind::Delta => match update.payload.as_object() {
                Some(delta) => self.apply_delta(delta),
                None => warn!("DELTA payload is not an object"),
            },
        }
    }

    /// Replace everything with `snapshot`.
    pub fn apply_full(&self, snapshot: &StateSnapshot) {
        let was_connected = {
            let mut state = self.state.write();
            let was_connected = state.connected;
            *state = MediaState {
                connected: true,
                track: TrackState {
                    track_id: snapshot.track.id.clone(),
                    title: snapshot.track.title.clone(),
                    artist: snapshot.track.artist.clone(),
                    cover_url: snapshot.track.cover.clone(),
                },
                playback: PlaybackState {
                    is_playing: snapshot.state.playing,
                    current_sec: snapshot.progress.now_sec,
                    total_sec: snapshot.progress.total_sec,
                    progress: snapshot.progress.ratio,
                    updated_at: Some(Instant::now()),
                },
                liked: snapshot.state.liked,
                disliked: snapshot.state.disliked,
                volume: VolumeLevel {
                    current: snapshot.volume.current,
                    is_muted: snapshot.volume.is_muted,
                },
            };
            was_connected
        };
        debug!(title = %snapshot.track.title, "Full player state");
        if !was_connected {
            self.emit(MediaEvent::Connection(true));
        }
        for event in [
            MediaEvent::Track,
            MediaEvent::Playback,
            MediaEvent::Volume,
            MediaEvent::Like,
            MediaEvent::Dislike,
        ] {
            self.emit(event);
        }
    }

    /// Merge a diff into the current state.
    ///
    /// Playback and volume changes inside an optimistic window are stored but
    /// not announced, so a stale reading does not flicker the button.
    pub fn apply_delta(&self, delta: &Map<String, Value>) {
        let mut events = Vec::new();
        {
            let mut state = self.state.write();

            if let Some(track) = delta.get("track").and_then(Value::as_object) {
                let before = state.track.clone();
                if let Some(id) = track.get("id") {
                    state.track.track_id = value_string(id);
                }
                if let Some(title) = track.get("title").and_then(Value::as_str) {
                    state.track.title = title.to_string();
                }
                if let Some(artist) = track.get("artist").and_then(Value::as_str) {
                    state.track.artist = artist.to_string();
                }
                if let Some(cover) = track.get("cover") {
                    state.track.cover_url = value_string(cover);
                }
                if state.track != before {
                    events.push(MediaEvent::Track);
                }
            }

            if let Some(flags) = delta.get("state").and_then(Value::as_object) {
                if let Some(liked) = flags.get("liked").and_then(Value::as_bool) {
                    state.liked = liked;
                    events.push(MediaEvent::Like);
                }
                if let Some(disliked) = flags.get("disliked").and_then(Value::as_bool) {
                    state.disliked = disliked;
                    events.push(MediaEvent::Dislike);
                }
                if let Some(playing) = flags.get("playing").and_then(Value::as_bool) {
                    let now = Instant::now();
                    state.playback.current_sec = state.playback.position_at(now);
                    state.playback.updated_at = Some(now);
                    state.playback.is_playing = playing;
                    events.push(MediaEvent::Playback);
                }
            }

            if let Some(progress) = delta.get("progress").and_then(Value::as_object) {
                if let Some(now_sec) = progress.get("now_sec").and_then(Value::as_f64) {
                    state.playback.current_sec = now_sec;
                }
                if let Some(total_sec) = progress.get("total_sec").and_then(Value::as_f64) {
                    state.playback.total_sec = total_sec;
                }
                if let Some(ratio) = progress.get("ratio").and_then(Value::as_f64) {
                    state.playback.progress = ratio;
                }
                state.playback.updated_at = Some(Instant::now());
                if !Self::held(&self.playback_hold) {
                    events.push(MediaEvent::Playback);
                }
            }

            if let Some(volume) = delta.get("volume").and_then(Value::as_object) {
                if let Some(current) = volume.get("current").and_then(Value::as_u64) {
                    state.volume.current = current.min(100) as u8;
                }
                if let Some(muted) = volume.get("is_muted").and_then(Value::as_bool) {
                    state.volume.is_muted = muted;
                }
                if !Self::held(&self.volume_hold) {
                    events.push(MediaEvent::Volume);
                }
            }
        }

        events.dedup();
        for event in events {
            self.emit(event);
        }
    }

    /// Publish a command's predicted result right away.
    pub fn predict(&self, outcome: &CommandOutcome) {
        let event = {
            let mut state = self.state.write();
            match *outcome {
                CommandOutcome::PlayPause { is_playing } => {
                    let now = Instant::now();
                    state.playback.current_sec = state.playback.position_at(now);
                    state.playback.updated_at = Some(now);
                    state.playback.is_playing = is_playing;
                    *self.playback_hold.lock() = Some(now + OPTIMISTIC_WINDOW);
                    MediaEvent::Playback
                }
                CommandOutcome::Like { liked } => {
                    state.liked = liked;
                    MediaEvent::Like
                }
                CommandOutcome::Dislike { disliked } => {
                    state.disliked = disliked;
                    MediaEvent::Dislike
                }
                CommandOutcome::Volume { volume } => {
                    state.volume.current = volume;
                    *self.volume_hold.lock() = Some(Instant::now() + OPTIMISTIC_WINDOW);
                    MediaEvent::Volume
                }
                CommandOutcome::Mute { is_muted } => {
                    state.volume.is_muted = is_muted;
                    *self.volume_hold.lock() = Some(Instant::now() + OPTIMISTIC_WINDOW);
                    MediaEvent::Volume
                }
                CommandOutcome::Skipped | CommandOutcome::PrevClicked => return,
            }
        };
        self.emit(event);
    }

    /// Feed the store from the notifier sink and the link's connection flag
    /// until `cancel` fires or both inputs close.
    pub async fn follow(
        &self,
        mut updates: mpsc::UnboundedReceiver<String>,
        mut connected: watch::Receiver<bool>,
        cancel: CancellationToken,
    ) {
        self.set_connected(*connected.borrow_and_update());
        let mut link_open = true;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                message = updates.recv() => match message {
                    Some(message) => self.apply_message(&message),
                    None => break,
                },
                changed = connected.changed(), if link_open => match changed {
                    Ok(()) => {
                        let now = *connected.borrow_and_update();
                        self.set_connected(now);
                    }
                    Err(_) => link_open = false,
                },
            }
        }
        debug!("Media store feed stopped");
    }
}

impl Default for MediaStore {
    fn default() -> Self {
        Self::new()
    }
}

fn value_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
