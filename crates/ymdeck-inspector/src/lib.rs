//! # ymdeck Inspector
//!
//! The property inspector side of the plugin, without the HTML: a session
//! that keeps a button's settings in sync with the host, the status badges
//! the panel shows, and the client for the remote token check.

pub mod error;
pub mod session;
pub mod state;
pub mod status;
pub mod token;

pub use error::{InspectorError, TokenError};
pub use session::{InspectorLaunch, InspectorSession};
pub use state::{InspectorState, InspectorUpdate, StatusTarget};
pub use status::{Panel, StatusIndicator, mode_description, panel_for_action};
pub use token::{TokenCheck, TokenValidator};
