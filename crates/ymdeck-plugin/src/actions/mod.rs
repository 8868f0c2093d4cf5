//! Built-in buttons.

mod info;
mod mute;
mod playpause;
mod progress;
mod rating;
mod skip;
mod volume;
mod volume_display;

use ymdeck_protocols::ActionKind;

use crate::registry::ActionFactory;

pub use info::{NowPlaying, WAITING_TITLE, clipboard_text, info_title};
pub use mute::Mute;
pub use playpause::{PlayPause, play_pause_image};
pub use progress::{PAUSED_REFRESH, PLAYING_REFRESH, ProgressDisplay, format_time, progress_text};
pub use rating::{Rating, RatingToggle, rating_image};
pub use skip::{Skip, SkipDirection};
pub use volume::{REPEAT_DELAY_TICKS, REPEAT_INTERVAL, VolumeStep};
pub use volume_display::{VolumeDisplay, level_variant};

/// Factory for every action in the manifest.
pub fn builtin() -> [(ActionKind, ActionFactory); 11] {
    [
        (ActionKind::PlayPause, PlayPause::create),
        (ActionKind::Next, Skip::next),
        (ActionKind::Prev, Skip::prev),
        (ActionKind::Like, RatingToggle::like),
        (ActionKind::Dislike, RatingToggle::dislike),
        (ActionKind::Mute, Mute::create),
        (ActionKind::VolumeUp, VolumeStep::up),
        (ActionKind::VolumeDown, VolumeStep::down),
        (ActionKind::VolumeDisplay, VolumeDisplay::create),
        (ActionKind::Progress, ProgressDisplay::create),
        (ActionKind::Info, NowPlaying::create),
    ]
}

#[cfg(test)]
#[path = "actions_tests.rs"]
mod tests;
