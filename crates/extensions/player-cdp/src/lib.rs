//! # ymdeck Player CDP
//!
//! Page backend for the player controller: reaches the desktop client's
//! player page over the Chrome DevTools Protocol.
//!
//! - [`cdp`]: page discovery over `/json/list` and a per-page WebSocket
//!   session.
//! - [`CdpDom`] / [`CdpHostApi`]: the controller's page accessors,
//!   implemented with `Runtime.callFunctionOn` on remote objects.
//! - [`PlayerLink`]: keeps a controller attached, reconnecting when the
//!   client restarts.

pub mod cdp;
mod dom;
mod host_api;
mod link;

#[cfg(test)]
mod fake_page;

pub use cdp::{CdpClient, CdpError, PageSession};
pub use dom::{CdpDom, PINNED_GROUP, TRANSIENT_GROUP};
pub use host_api::CdpHostApi;
pub use link::{LinkConfig, PlayerLink};
