//! Stream Deck plugin runtime for ymdeck.
//!
//! ```text
//!  Stream Deck host ──ws──► HostConnection ──text──► Router ──► Action instances
//!        ▲                                                        │    ▲
//!        └──────────── HostSender (setImage, setTitle, ...) ◄─────┘    │ MediaEvent
//!                                                                       │
//!  PlayerLink ─► ChangeNotifier ─FULL_STATE/DELTA─► MediaStore ─────────┘
//! ```
//!
//! - [`host`] keeps the socket to the host alive and registers the plugin.
//! - [`router`] routes host events to per-button [`Action`]s.
//! - [`store`] mirrors the player state and fans out change events.
//! - [`actions`] holds the built-in buttons.

pub mod action;
pub mod actions;
pub mod assets;
pub mod clipboard;
pub mod error;
pub mod host;
pub mod player;
pub mod registry;
pub mod router;
pub mod runtime;
pub mod store;

#[cfg(test)]
mod fake_host;
#[cfg(test)]
mod test_support;

pub use action::{Action, ActionEnv, ActionHandle, TaskSlot};
pub use assets::Assets;
pub use clipboard::{Clipboard, SystemClipboard};
pub use error::{HostError, PluginError};
pub use host::{HostConnection, HostSender, HostSettings};
pub use player::{MediaControl, PlayerSource};
pub use registry::{ActionFactory, ActionRegistry};
pub use router::Router;
pub use runtime::{PluginOptions, run_plugin};
pub use store::{MediaEvent, MediaState, MediaStore, Topic};
