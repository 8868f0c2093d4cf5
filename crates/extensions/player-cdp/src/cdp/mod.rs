//! Chrome DevTools Protocol client.
//!
//! The desktop client is an Electron app started with
//! `--remote-debugging-port`. Each page exposes its own WebSocket in
//! `/json/list`, so sessions connect straight to the page rather than
//! attaching through the browser target.
//!
//! ```rust,ignore
//! let client = CdpClient::new("http://127.0.0.1:9222", Duration::from_secs(5))?;
//! let page = client.find_page(&["music.yandex".into()]).await?;
//! let session = client.attach(&page).await?;
//! let title = session.evaluate("document.title").await?;
//! ```

mod client;
mod error;
mod protocol;
mod session;

pub use client::{CdpClient, select_page};
pub use error::CdpError;
pub use protocol::*;
pub use session::PageSession;
