//! Normalized player state.

use serde::{Deserialize, Serialize};

use crate::signals;

/// Point-in-time read of the player.
///
/// Serializes to the stable shape sent in `FULL_STATE` / `DELTA` updates.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub track: TrackInfo,
    pub state: TransportState,
    pub progress: Progress,
    pub volume: VolumeState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackInfo {
    /// `None` means "unknown track", not an error.
    pub id: Option<String>,
    pub title: String,
    pub artist: String,
    pub cover: Option<String>,
}

impl Default for TrackInfo {
    fn default() -> Self {
        Self {
            id: None,
            title: UNKNOWN.to_string(),
            artist: UNKNOWN.to_string(),
            cover: None,
        }
    }
}

/// Placeholder for a missing title or artist.
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransportState {
    pub playing: bool,
    pub liked: bool,
    pub disliked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Progress {
    pub now_sec: f64,
    pub total_sec: f64,
    /// Always within `[0, 1]`; `0` when the total is unknown.
    pub ratio: f64,
}

impl Progress {
    pub fn new(now_sec: f64, total_sec: f64) -> Self {
        let now_sec = if now_sec.is_finite() { now_sec } else { 0.0 };
        let total_sec = if total_sec.is_finite() { total_sec } else { 0.0 };
        Self {
            now_sec,
            total_sec,
            ratio: signals::progress_ratio(now_sec, total_sec),
        }
    }
}

/// Where a volume reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeMethod {
    Api,
    Dom,
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VolumeState {
    /// Percent, always within `[0, 100]`.
    pub current: u8,
    pub is_muted: bool,
    pub method: VolumeMethod,
}
