//! # ymdeck Protocols
//!
//! Message types shared by the plugin and the property inspector. Field and
//! event names follow the Stream Deck host exactly; nothing here does I/O.
//!
//! - [`InboundEvent`] - envelope of every message the host sends
//! - [`OutboundMessage`] - commands sent to the host
//! - [`InspectorMessage`] / [`PluginRequest`] - the plugin <-> inspector
//!   payloads carried inside `sendToPropertyInspector` / `sendToPlugin`
//! - [`ActionKind`] - the action UUIDs the plugin registers
//! - [`ButtonSettings`] / [`GlobalSettings`] - persisted settings

pub mod action;
pub mod error;
pub mod event;
pub mod inspector;
pub mod launch;
pub mod outbound;
pub mod settings;

pub use action::{ACTION_PREFIX, ActionKind};
pub use error::ProtocolError;
pub use event::{EventKind, InboundEvent};
pub use inspector::{InspectorMessage, LocalStatus, PluginRequest, TokenStatus};
pub use launch::{ActionInfo, LaunchInfo};
pub use outbound::OutboundMessage;
pub use settings::{ButtonSettings, ControlMode, GlobalSettings};
