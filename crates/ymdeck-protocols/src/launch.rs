//! Launch arguments handed over by the host.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ProtocolError;

/// The `-info` JSON passed to the plugin and the inspector.
///
/// Only the fields ymdeck reads are typed; the rest is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchInfo {
    #[serde(default)]
    pub application: ApplicationInfo,
    #[serde(default)]
    pub plugin: PluginInfo,
    /// Present in the inspector's copy of the info.
    #[serde(default, rename = "pluginUUID", skip_serializing_if = "Option::is_none")]
    pub plugin_uuid: Option<String>,
    #[serde(default)]
    pub devices: Vec<DeviceInfo>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LaunchInfo {
    /// Parse the `-info` argument. An empty string gives the default.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationInfo {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub language: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginInfo {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: i64,
}

/// The `-actionInfo` JSON passed to a property inspector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionInfo {
    pub action: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub device: String,
    #[serde(default)]
    pub payload: Value,
}

impl ActionInfo {
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    /// `payload.settings`, empty when absent.
    pub fn settings(&self) -> Map<String, Value> {
        self.payload
            .get("settings")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }
}
