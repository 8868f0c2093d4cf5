//! Player page controller for ymdeck.
//!
//! Reads and drives the Yandex Music player bar through an injected page
//! accessor rather than a browser binding, so the same controller runs against
//! a live page (see the CDP backend) or an in-memory DOM in tests.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   extract / command   ┌──────────────┐
//! │ PlayerController │ ────────────────────► │  dyn Dom     │ (page elements)
//! │  Resolver+cache  │ ────────────────────► │  dyn HostApi │ (window.externalAPI)
//! └────────▲─────────┘                       └──────────────┘
//!          │ tick (100ms)
//! ┌────────┴─────────┐   {"type","payload"}  ┌──────────────┐
//! │  ChangeNotifier  │ ────────────────────► │ dyn NotifySink│
//! └──────────────────┘                       └──────────────┘
//! ```
//!
//! - [`Resolver`] walks ordered selector chains and caches live handles.
//! - [`signals`] holds the markup heuristics (icon hrefs, class substrings,
//!   clock text) as plain functions.
//! - [`PlayerController`] extracts a [`StateSnapshot`] and dispatches commands.
//! - [`ChangeNotifier`] polls, diffs against the last snapshot and emits
//!   `FULL_STATE` / `DELTA` updates.

mod controller;
pub mod diff;
mod dispatcher;
mod dom;
mod error;
mod host_api;
mod notifier;
mod resolver;
mod selectors;
pub mod signals;
mod snapshot;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use controller::PlayerController;
pub use dispatcher::{CommandOutcome, VolumeAction, VOLUME_STEP};
pub use dom::{Dom, DomError, NodeRef};
pub use error::{Control, PlayerError};
pub use host_api::HostApi;
pub use notifier::{ChangeNotifier, NotifySink, ObserverState, PlayerUpdate, UpdateKind};
pub use resolver::{ElementKey, Resolver};
pub use selectors::{PlayerSelectors, SelectorChain};
pub use snapshot::{
    Progress, StateSnapshot, TrackInfo, TransportState, UNKNOWN, VolumeMethod, VolumeState,
};
