//! Optional structured player API exposed by the page.

use async_trait::async_trait;

use crate::dom::DomError;

/// The page's own player API (`window.externalAPI` in the desktop client).
///
/// Each capability is independent: `Ok(None)` / `Ok(false)` means the page
/// does not offer it and the caller falls back to DOM scraping for that
/// capability only.
#[async_trait]
pub trait HostApi: Send + Sync {
    /// Identifier of the current track.
    async fn current_track_id(&self) -> Result<Option<String>, DomError>;

    /// Elapsed seconds. Non-numeric readings are reported as `0.0`.
    async fn progress(&self) -> Result<Option<f64>, DomError>;

    /// Track duration in seconds. Non-numeric readings are reported as `0.0`.
    async fn duration(&self) -> Result<Option<f64>, DomError>;

    /// Volume on a 0..1 (or 0..100) scale.
    async fn volume(&self) -> Result<Option<f64>, DomError>;

    async fn is_muted(&self) -> Result<Option<bool>, DomError>;

    /// Set the volume as a 0..1 fraction. Returns `false` when unsupported.
    async fn set_volume(&self, fraction: f64) -> Result<bool, DomError>;

    /// Returns `false` when unsupported.
    async fn toggle_mute(&self) -> Result<bool, DomError>;
}
