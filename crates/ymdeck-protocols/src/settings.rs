//! Persisted settings.
//!
//! The host stores settings as opaque JSON. Keys ymdeck does not know are
//! kept in `extra` so they survive a read-modify-write cycle.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// How a button drives the player.
///
/// Only local control is implemented; `ynison` is accepted and written back so
/// settings made by other versions of the plugin are not lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlMode {
    #[default]
    Local,
    Ynison,
}

impl ControlMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlMode::Local => "local",
            ControlMode::Ynison => "ynison",
        }
    }

    /// Lenient parse: anything but `ynison` is local.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("ynison") {
            ControlMode::Ynison
        } else {
            ControlMode::Local
        }
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ControlMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ControlMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(ControlMode::parse).unwrap_or_default())
    }
}

fn default_style() -> String {
    "v1".to_string()
}

fn default_display_mode() -> String {
    "cover_title_artists".to_string()
}

fn default_progress_mode() -> String {
    "stacked".to_string()
}

fn default_true() -> bool {
    true
}

/// Per-button settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonSettings {
    #[serde(default)]
    pub control_mode: ControlMode,
    #[serde(default = "default_display_mode")]
    pub display_mode: String,
    #[serde(default = "default_style")]
    pub play_style: String,
    #[serde(default = "default_style")]
    pub prev_style: String,
    #[serde(default = "default_style")]
    pub next_style: String,
    #[serde(default = "default_style")]
    pub like_style: String,
    #[serde(default = "default_style")]
    pub dislike_style: String,
    #[serde(default = "default_progress_mode")]
    pub progress_mode: String,
    #[serde(default = "default_style")]
    pub volume_style: String,
    #[serde(default = "default_style")]
    pub mute_style: String,
    #[serde(default = "default_true")]
    pub show_cover: bool,
    #[serde(default = "default_true")]
    pub show_title: bool,
    #[serde(default = "default_true")]
    pub show_artist: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ButtonSettings {
    fn default() -> Self {
        Self {
            control_mode: ControlMode::Local,
            display_mode: default_display_mode(),
            play_style: default_style(),
            prev_style: default_style(),
            next_style: default_style(),
            like_style: default_style(),
            dislike_style: default_style(),
            progress_mode: default_progress_mode(),
            volume_style: default_style(),
            mute_style: default_style(),
            show_cover: true,
            show_title: true,
            show_artist: true,
            extra: Map::new(),
        }
    }
}

impl ButtonSettings {
    /// Read settings from the host's object. A known key with a value of the
    /// wrong type falls back to its default; the raw value is kept in `extra`.
    pub fn from_map(map: &Map<String, Value>) -> Self {
        if let Ok(settings) = serde_json::from_value(Value::Object(map.clone())) {
            return settings;
        }
        let defaults = serde_json::to_value(Self::default()).unwrap_or(Value::Null);
        let mut repaired = map.clone();
        if let Value::Object(defaults) = defaults {
            for (key, default) in defaults {
                if let Some(current) = repaired.get(&key) {
                    if std::mem::discriminant(current) != std::mem::discriminant(&default) {
                        repaired.insert(key, default);
                    }
                }
            }
        }
        serde_json::from_value(Value::Object(repaired)).unwrap_or_default()
    }

    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.to_map())
    }

    /// Overlay `patch` on these settings.
    pub fn merge(&mut self, patch: &Map<String, Value>) {
        let mut map = self.to_map();
        for (key, value) in patch {
            map.insert(key.clone(), value.clone());
        }
        *self = Self::from_map(&map);
    }
}

/// Plugin-wide settings shared by every button and inspector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Typed in by hand in the inspector, so a string or a number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_port: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GlobalSettings {
    pub fn from_map(map: &Map<String, Value>) -> Self {
        serde_json::from_value(Value::Object(map.clone())).unwrap_or_else(|_| Self {
            extra: map.clone(),
            ..Self::default()
        })
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn local_port(&self) -> Option<u16> {
        match self.local_port.as_ref()? {
            Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
