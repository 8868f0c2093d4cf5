//! Controller error types.

use std::fmt;

use thiserror::Error;

use crate::dom::DomError;

/// Player controls a command can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    PlayPause,
    Next,
    Prev,
    Like,
    Dislike,
    Volume,
    Mute,
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Control::PlayPause => "play/pause button",
            Control::Next => "next button",
            Control::Prev => "previous button",
            Control::Like => "like button",
            Control::Dislike => "dislike button",
            Control::Volume => "volume slider",
            Control::Mute => "mute button",
        };
        f.write_str(name)
    }
}

/// Controller errors.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// The player bar is not on the page (not loaded yet, or another page).
    #[error("Player bar not found")]
    ContainerNotFound,

    /// A control could not be resolved or is disabled.
    #[error("Control unavailable: {0}")]
    ControlUnavailable(Control),

    /// Reading the page failed unexpectedly.
    #[error("Extraction failed: {0}")]
    Extraction(String),
}

impl PlayerError {
    /// Short machine-readable reason code.
    pub fn reason(&self) -> &'static str {
        match self {
            PlayerError::ContainerNotFound => "BAR_NOT_FOUND",
            PlayerError::ControlUnavailable(_) => "btn_not_found_or_disabled",
            PlayerError::Extraction(_) => "extraction_failed",
        }
    }
}

impl From<DomError> for PlayerError {
    fn from(e: DomError) -> Self {
        PlayerError::Extraction(e.to_string())
    }
}
