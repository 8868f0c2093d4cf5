//! What the inspector panel shows: status badges, per-action settings
//! sections and the control mode blurb.

use serde::Serialize;
use ymdeck_protocols::{ActionKind, ControlMode};

/// Text and colors of a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusIndicator {
    pub text: &'static str,
    pub background: &'static str,
    pub color: &'static str,
}

impl StatusIndicator {
    /// Badge for a raw status string as sent in `TokenStatus` / `LocalStatus`.
    pub fn for_status(status: &str) -> Self {
        let (text, background, color) = match status {
            "valid" | "connected" => ("ПОДКЛЮЧЕНО", "#1b5e20", "#a5d6a7"),
            "invalid" => ("НЕВАЛИДНО", "#b71c1c", "#ffcdd2"),
            "offline" | "disconnected" => ("ОФФЛАЙН", "#424242", "#bdbdbd"),
            "loading" => ("ЗАГРУЗКА...", "#ff6f00", "#ffe0b2"),
            _ => ("UNKNOWN", "#ff6f00", "#ffe0b2"),
        };
        Self {
            text,
            background,
            color,
        }
    }
}

/// Settings section shown for an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Info,
    Like,
    Dislike,
    Next,
    Prev,
    PlayPause,
    Progress,
    Mute,
    Volume,
}

impl Panel {
    pub fn for_action(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Info => Panel::Info,
            ActionKind::Like => Panel::Like,
            ActionKind::Dislike => Panel::Dislike,
            ActionKind::Next => Panel::Next,
            ActionKind::Prev => Panel::Prev,
            ActionKind::PlayPause => Panel::PlayPause,
            ActionKind::Progress => Panel::Progress,
            ActionKind::Mute => Panel::Mute,
            ActionKind::VolumeUp | ActionKind::VolumeDown | ActionKind::VolumeDisplay => Panel::Volume,
        }
    }

    /// Settings keys the section edits.
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            Panel::Info => &["show_cover", "show_title", "show_artist"],
            Panel::Like => &["like_style"],
            Panel::Dislike => &["dislike_style"],
            Panel::Next => &["next_style"],
            Panel::Prev => &["prev_style"],
            Panel::PlayPause => &["play_style"],
            Panel::Progress => &["progress_mode"],
            Panel::Mute => &["mute_style"],
            Panel::Volume => &["volume_style"],
        }
    }
}

/// Section for an action UUID; `None` for UUIDs outside the plugin.
pub fn panel_for_action(uuid: &str) -> Option<Panel> {
    ActionKind::from_uuid(uuid).ok().map(Panel::for_action)
}

pub fn mode_description(mode: ControlMode) -> &'static str {
    match mode {
        ControlMode::Local => "Управление клиентом на этом компьютере",
        ControlMode::Ynison => "Удаленное управление через протокол ynison (бета)",
    }
}
