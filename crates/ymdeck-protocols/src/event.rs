//! Inbound host events.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ProtocolError;

/// Events the plugin handles. Anything else is ignored by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    KeyDown,
    KeyUp,
    WillAppear,
    WillDisappear,
    DidReceiveSettings,
    DidReceiveGlobalSettings,
    PropertyInspectorDidAppear,
    SendToPlugin,
    SendToPropertyInspector,
    SystemDidWakeUp,
    ApplicationDidLaunch,
    ApplicationDidTerminate,
    TitleParametersDidChange,
}

impl EventKind {
    pub const ALL: [EventKind; 13] = [
        EventKind::KeyDown,
        EventKind::KeyUp,
        EventKind::WillAppear,
        EventKind::WillDisappear,
        EventKind::DidReceiveSettings,
        EventKind::DidReceiveGlobalSettings,
        EventKind::PropertyInspectorDidAppear,
        EventKind::SendToPlugin,
        EventKind::SendToPropertyInspector,
        EventKind::SystemDidWakeUp,
        EventKind::ApplicationDidLaunch,
        EventKind::ApplicationDidTerminate,
        EventKind::TitleParametersDidChange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::KeyDown => "keyDown",
            EventKind::KeyUp => "keyUp",
            EventKind::WillAppear => "willAppear",
            EventKind::WillDisappear => "willDisappear",
            EventKind::DidReceiveSettings => "didReceiveSettings",
            EventKind::DidReceiveGlobalSettings => "didReceiveGlobalSettings",
            EventKind::PropertyInspectorDidAppear => "propertyInspectorDidAppear",
            EventKind::SendToPlugin => "sendToPlugin",
            EventKind::SendToPropertyInspector => "sendToPropertyInspector",
            EventKind::SystemDidWakeUp => "systemDidWakeUp",
            EventKind::ApplicationDidLaunch => "applicationDidLaunch",
            EventKind::ApplicationDidTerminate => "applicationDidTerminate",
            EventKind::TitleParametersDidChange => "titleParametersDidChange",
        }
    }

    /// Events addressed to one action instance (routed by context).
    pub fn is_action_event(&self) -> bool {
        matches!(
            self,
            EventKind::KeyDown
                | EventKind::KeyUp
                | EventKind::WillAppear
                | EventKind::WillDisappear
                | EventKind::DidReceiveSettings
                | EventKind::PropertyInspectorDidAppear
                | EventKind::TitleParametersDidChange
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or(())
    }
}

/// Envelope of a host message: `{event, context, device, action, payload}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl InboundEvent {
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    /// `None` for events the plugin does not know.
    pub fn kind(&self) -> Option<EventKind> {
        self.event.parse().ok()
    }

    pub fn context(&self) -> Result<&str, ProtocolError> {
        self.context
            .as_deref()
            .ok_or(ProtocolError::MissingField("context"))
    }

    /// `payload.settings` as an object, empty when absent.
    pub fn settings(&self) -> Map<String, Value> {
        self.payload
            .as_ref()
            .and_then(|p| p.get("settings"))
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }

    /// The payload object, empty when absent or not an object.
    pub fn payload_object(&self) -> Map<String, Value> {
        self.payload
            .as_ref()
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
