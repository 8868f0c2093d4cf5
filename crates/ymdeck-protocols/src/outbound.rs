//! Messages sent to the host.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Title/image target: hardware and software.
pub const TARGET_BOTH: u8 = 0;

/// A command for the host.
///
/// The registration message uses the event name the host handed over at
/// launch, so the event is a plain string rather than an enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl OutboundMessage {
    fn new(event: &str) -> Self {
        Self {
            event: event.to_string(),
            uuid: None,
            action: None,
            context: None,
            payload: None,
        }
    }

    fn context(mut self, context: &str) -> Self {
        self.context = Some(context.to_string());
        self
    }

    fn payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// `{event: <registerEvent>, uuid}`, the first message on a connection.
    pub fn register(register_event: &str, uuid: &str) -> Self {
        Self {
            uuid: Some(uuid.to_string()),
            ..Self::new(register_event)
        }
    }

    pub fn get_settings(context: &str) -> Self {
        Self::new("getSettings").context(context)
    }

    pub fn set_settings(context: &str, settings: Value) -> Self {
        Self::new("setSettings").context(context).payload(settings)
    }

    pub fn get_global_settings(context: &str) -> Self {
        Self::new("getGlobalSettings").context(context)
    }

    pub fn set_global_settings(context: &str, settings: Value) -> Self {
        Self::new("setGlobalSettings").context(context).payload(settings)
    }

    pub fn send_to_property_inspector(action: &str, context: &str, payload: Value) -> Self {
        Self {
            action: Some(action.to_string()),
            ..Self::new("sendToPropertyInspector").context(context).payload(payload)
        }
    }

    /// Sent by a property inspector to its plugin.
    pub fn send_to_plugin(action: Option<&str>, context: &str, payload: Value) -> Self {
        Self {
            action: action.map(str::to_string),
            ..Self::new("sendToPlugin").context(context).payload(payload)
        }
    }

    pub fn set_title(context: &str, title: &str) -> Self {
        Self::new("setTitle")
            .context(context)
            .payload(json!({"title": title, "target": TARGET_BOTH}))
    }

    /// `image` is a data URI (or empty to restore the manifest image).
    pub fn set_image(context: &str, image: &str, state: Option<u8>) -> Self {
        let mut payload = json!({"target": TARGET_BOTH, "image": image});
        if let Some(state) = state {
            payload["state"] = json!(state);
        }
        Self::new("setImage").context(context).payload(payload)
    }

    pub fn set_state(context: &str, state: u8) -> Self {
        Self::new("setState")
            .context(context)
            .payload(json!({"state": state}))
    }

    pub fn show_alert(context: &str) -> Self {
        Self::new("showAlert").context(context)
    }

    pub fn show_ok(context: &str) -> Self {
        Self::new("showOk").context(context)
    }

    pub fn open_url(url: &str) -> Self {
        Self::new("openUrl").payload(json!({"url": url}))
    }

    pub fn log_message(message: &str) -> Self {
        Self::new("logMessage").payload(json!({"message": message}))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
#[path = "outbound_tests.rs"]
mod tests;
