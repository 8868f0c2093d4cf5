//! Inspector-side copy of the button and plugin settings.

use serde_json::{Map, Value};
use tracing::{debug, trace};
use ymdeck_protocols::{ActionInfo, ControlMode, EventKind, GlobalSettings, InboundEvent};

use crate::status::StatusIndicator;

/// Which badge a status message targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTarget {
    Token,
    Local,
}

/// A change applied from the host.
#[derive(Debug, Clone, PartialEq)]
pub enum InspectorUpdate {
    Settings(Map<String, Value>),
    GlobalSettings(GlobalSettings),
    Status { target: StatusTarget, status: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InspectorState {
    pub settings: Map<String, Value>,
    pub global: GlobalSettings,
    pub token_status: Option<String>,
    pub local_status: Option<String>,
}

impl InspectorState {
    /// Initial state from `actionInfo`; `control_mode` defaults to `local`.
    pub fn from_action_info(info: &ActionInfo) -> Self {
        let mut settings = info.settings();
        settings
            .entry("control_mode")
            .or_insert_with(|| Value::String(ControlMode::Local.as_str().to_string()));
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn control_mode(&self) -> ControlMode {
        self.settings
            .get("control_mode")
            .and_then(Value::as_str)
            .map(ControlMode::parse)
            .unwrap_or_default()
    }

    pub fn token_indicator(&self) -> Option<StatusIndicator> {
        self.token_status.as_deref().map(StatusIndicator::for_status)
    }

    pub fn local_indicator(&self) -> Option<StatusIndicator> {
        self.local_status.as_deref().map(StatusIndicator::for_status)
    }

    /// Apply one host message. Returns what changed, if anything.
    pub fn apply(&mut self, event: &InboundEvent) -> Option<InspectorUpdate> {
        match event.kind()? {
            EventKind::DidReceiveSettings => {
                self.settings = event.settings();
                debug!(keys = self.settings.len(), "Settings received");
                Some(InspectorUpdate::Settings(self.settings.clone()))
            }
            EventKind::DidReceiveGlobalSettings => {
                self.global = GlobalSettings::from_map(&event.settings());
                debug!(has_token = self.global.token().is_some(), "Global settings received");
                Some(InspectorUpdate::GlobalSettings(self.global.clone()))
            }
            EventKind::SendToPropertyInspector => {
                let payload = event.payload_object();
                let target = match payload.get("event").and_then(Value::as_str)? {
                    "TokenStatus" => StatusTarget::Token,
                    "LocalStatus" => StatusTarget::Local,
                    other => {
                        trace!(event = other, "Ignoring plugin message");
                        return None;
                    }
                };
                let status = payload
                    .get("status")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                match target {
                    StatusTarget::Token => self.token_status = Some(status.clone()),
                    StatusTarget::Local => self.local_status = Some(status.clone()),
                }
                Some(InspectorUpdate::Status { target, status })
            }
            _ => None,
        }
    }
}
