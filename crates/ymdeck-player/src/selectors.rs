//! Selector chains for the player bar.
//!
//! Each logical element has an ordered list of CSS selectors. Stable
//! `data-test-id` hooks come first, class-name substring matches next, and
//! semantic tag/attribute matches last, because the client's markup shifts
//! between releases.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Ordered fallback list of selectors; the first one that matches wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectorChain(Vec<String>);

impl SelectorChain {
    pub fn new(selectors: Vec<String>) -> Self {
        Self(selectors)
    }

    fn from_static(selectors: &[&str]) -> Self {
        Self(selectors.iter().map(|s| s.to_string()).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// All selector chains used by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSelectors {
    pub scope: SelectorChain,
    pub title: SelectorChain,
    pub artist: SelectorChain,
    pub cover: SelectorChain,
    pub play_pause: SelectorChain,
    /// Present only while audio is playing.
    pub pause_indicator: SelectorChain,
    pub next: SelectorChain,
    pub prev: SelectorChain,
    pub like: SelectorChain,
    pub dislike: SelectorChain,
    pub timeline: SelectorChain,
    pub time_now: SelectorChain,
    pub time_end: SelectorChain,
    pub volume_slider: SelectorChain,
    pub mute_button: SelectorChain,
    pub track_link: SelectorChain,
    /// Icon reference inside like/dislike buttons.
    pub toggle_icon: SelectorChain,
    /// Icon reference inside the mute button.
    pub mute_icon: SelectorChain,
}

impl Default for PlayerSelectors {
    fn default() -> Self {
        Self {
            scope: SelectorChain::from_static(&[
                "[data-test-id='PLAYERBAR_DESKTOP']",
                "div[class*='PlayerBarDesktop']",
                "section[class*='PlayerBarDesktop']",
            ]),
            title: SelectorChain::from_static(&[
                "[data-test-id='TRACK_TITLE']",
                "[class*='PlayerBarTitle_title']",
                "a[href*='/track/']",
            ]),
            artist: SelectorChain::from_static(&[
                "[data-test-id='SEPARATED_ARTIST_TITLE']",
                "[class*='PlayerBarTitle_artist']",
                "a[href*='/artist/']",
            ]),
            cover: SelectorChain::from_static(&[
                "img[data-test-id='ENTITY_COVER_IMAGE']",
                "[class*='PlayerBarDesktop_cover'] img",
            ]),
            play_pause: SelectorChain::from_static(&[
                "button[class*='pause'], button[class*='play'], [data-test-id='PAUSE_BUTTON'], [data-test-id='PLAY_BUTTON']",
            ]),
            pause_indicator: SelectorChain::from_static(&[
                "button[class*='pause'], [data-test-id='PAUSE_BUTTON']",
            ]),
            next: SelectorChain::from_static(&[
                "[data-test-id='NEXT_TRACK_BUTTON']",
                "button[aria-label*='Next']",
                "button[class*='next']",
            ]),
            prev: SelectorChain::from_static(&[
                "[data-test-id='PREVIOUS_TRACK_BUTTON']",
                "button[aria-label*='Prev']",
                "button[class*='prev']",
            ]),
            like: SelectorChain::from_static(&[
                "[data-test-id='LIKE_BUTTON']",
                "button[class*='like']:not([class*='dislike'])",
            ]),
            dislike: SelectorChain::from_static(&[
                "[data-test-id='DISLIKE_BUTTON']",
                "button[class*='dislike']",
            ]),
            timeline: SelectorChain::from_static(&[
                "input[data-test-id='TIMECODE_SLIDER'], input[type='range']",
            ]),
            time_now: SelectorChain::from_static(&["[data-test-id='TIMECODE_TIME_START']"]),
            time_end: SelectorChain::from_static(&["[data-test-id='TIMECODE_TIME_END']"]),
            volume_slider: SelectorChain::from_static(&[
                "input[data-test-id='VOLUME_SLIDER']",
                "input[class*='ChangeVolume_slider']",
                "div[class*='Volume'] input[type='range']",
            ]),
            mute_button: SelectorChain::from_static(&[
                "button[data-test-id='VOLUME_BUTTON']",
                "button[class*='ChangeVolume_button']",
                "button[class*='Volume']",
            ]),
            track_link: SelectorChain::from_static(&["a[href*='/track/']"]),
            toggle_icon: SelectorChain::from_static(&["use"]),
            mute_icon: SelectorChain::from_static(&["svg use"]),
        }
    }
}

impl PlayerSelectors {
    /// Apply per-chain overrides keyed by field name. Unknown names and empty
    /// chains are ignored with a warning.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, Vec<String>>) -> Self {
        for (name, selectors) in overrides {
            if selectors.is_empty() {
                warn!(chain = %name, "Ignoring empty selector override");
                continue;
            }
            let chain = SelectorChain::new(selectors.clone());
            match self.chain_mut(name) {
                Some(slot) => *slot = chain,
                None => warn!(chain = %name, "Unknown selector chain in override"),
            }
        }
        self
    }

    fn chain_mut(&mut self, name: &str) -> Option<&mut SelectorChain> {
        let slot = match name {
            "scope" => &mut self.scope,
            "title" => &mut self.title,
            "artist" => &mut self.artist,
            "cover" => &mut self.cover,
            "play_pause" => &mut self.play_pause,
            "pause_indicator" => &mut self.pause_indicator,
            "next" => &mut self.next,
            "prev" => &mut self.prev,
            "like" => &mut self.like,
            "dislike" => &mut self.dislike,
            "timeline" => &mut self.timeline,
            "time_now" => &mut self.time_now,
            "time_end" => &mut self.time_end,
            "volume_slider" => &mut self.volume_slider,
            "mute_button" => &mut self.mute_button,
            "track_link" => &mut self.track_link,
            "toggle_icon" => &mut self.toggle_icon,
            "mute_icon" => &mut self.mute_icon,
            _ => return None,
        };
        Some(slot)
    }
}
