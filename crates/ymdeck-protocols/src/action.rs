//! Action UUIDs.

use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;

/// Common prefix of every action UUID in the manifest.
pub const ACTION_PREFIX: &str = "com.judd1.yandex_music.action.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    PlayPause,
    Next,
    Prev,
    Like,
    Dislike,
    Mute,
    VolumeUp,
    VolumeDown,
    VolumeDisplay,
    Progress,
    Info,
}

impl ActionKind {
    pub const ALL: [ActionKind; 11] = [
        ActionKind::PlayPause,
        ActionKind::Next,
        ActionKind::Prev,
        ActionKind::Like,
        ActionKind::Dislike,
        ActionKind::Mute,
        ActionKind::VolumeUp,
        ActionKind::VolumeDown,
        ActionKind::VolumeDisplay,
        ActionKind::Progress,
        ActionKind::Info,
    ];

    /// UUID suffix after [`ACTION_PREFIX`].
    pub fn suffix(&self) -> &'static str {
        match self {
            ActionKind::PlayPause => "playpause",
            ActionKind::Next => "next",
            ActionKind::Prev => "prev",
            ActionKind::Like => "like",
            ActionKind::Dislike => "dislike",
            ActionKind::Mute => "mute",
            ActionKind::VolumeUp => "volumeup",
            ActionKind::VolumeDown => "volumedown",
            ActionKind::VolumeDisplay => "volume_display",
            ActionKind::Progress => "progress",
            ActionKind::Info => "info",
        }
    }

    pub fn uuid(&self) -> String {
        format!("{}{}", ACTION_PREFIX, self.suffix())
    }

    pub fn from_uuid(uuid: &str) -> Result<Self, ProtocolError> {
        uuid.parse()
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", ACTION_PREFIX, self.suffix())
    }
}

impl FromStr for ActionKind {
    type Err = ProtocolError;

    fn from_str(uuid: &str) -> Result<Self, Self::Err> {
        uuid.strip_prefix(ACTION_PREFIX)
            .and_then(|suffix| ActionKind::ALL.into_iter().find(|k| k.suffix() == suffix))
            .ok_or_else(|| ProtocolError::UnknownAction(uuid.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_round_trip() {
        for kind in ActionKind::ALL {
            assert_eq!(ActionKind::from_uuid(&kind.uuid()).unwrap(), kind);
        }
    }

    #[test]
    fn test_known_uuid() {
        assert_eq!(
            ActionKind::from_uuid("com.judd1.yandex_music.action.volume_display").unwrap(),
            ActionKind::VolumeDisplay
        );
        assert_eq!(ActionKind::Like.to_string(), "com.judd1.yandex_music.action.like");
    }

    #[test]
    fn test_unknown_uuid() {
        assert!(matches!(
            ActionKind::from_uuid("com.other.plugin.like"),
            Err(ProtocolError::UnknownAction(_))
        ));
        assert!(ActionKind::from_uuid("com.judd1.yandex_music.action.shuffle").is_err());
    }
}
