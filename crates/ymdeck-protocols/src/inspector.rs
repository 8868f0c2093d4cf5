//! Payloads exchanged between the plugin and its property inspector.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Remote-account token status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStatus {
    Valid,
    Invalid,
    Missing,
    Offline,
}

/// Link to the local desktop client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocalStatus {
    Connected,
    Disconnected,
    Loading,
}

impl LocalStatus {
    pub fn from_connected(connected: bool) -> Self {
        if connected {
            LocalStatus::Connected
        } else {
            LocalStatus::Disconnected
        }
    }
}

/// Plugin -> inspector, inside `sendToPropertyInspector`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum InspectorMessage {
    TokenStatus { status: TokenStatus },
    LocalStatus { status: LocalStatus },
}

impl InspectorMessage {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Decode a `sendToPropertyInspector` payload. Unknown payloads and unknown
    /// statuses give `None`.
    pub fn from_payload(payload: &Value) -> Option<Self> {
        serde_json::from_value(payload.clone()).ok()
    }
}

/// Inspector -> plugin, inside `sendToPlugin`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum PluginRequest {
    /// Merge `settings` into every visible action.
    #[serde(rename = "applySettingsToAll")]
    ApplySettingsToAll {
        #[serde(default)]
        settings: Map<String, Value>,
    },

    /// Validate a token and answer with a `TokenStatus`.
    #[serde(rename = "checkToken")]
    CheckToken { token: String },
}

impl PluginRequest {
    pub fn from_payload(payload: &Value) -> Option<Self> {
        serde_json::from_value(payload.clone()).ok()
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
