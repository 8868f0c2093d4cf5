//! DevTools endpoint discovery.

use std::time::Duration;

use tracing::{debug, trace};

use super::error::CdpError;
use super::protocol::PageInfo;
use super::session::PageSession;

/// HTTP side of a DevTools endpoint: lists pages and opens sessions to them.
#[derive(Debug, Clone)]
pub struct CdpClient {
    /// HTTP endpoint for page discovery.
    http_endpoint: String,
    http: reqwest::Client,
    /// Per-request timeout, shared with the sessions it opens.
    timeout: Duration,
}

impl CdpClient {
    /// Create a client for `endpoint` (e.g. `http://127.0.0.1:9222`).
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, CdpError> {
        let http_endpoint = endpoint.trim_end_matches('/').to_string();
        url::Url::parse(&http_endpoint)?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_endpoint,
            http,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.http_endpoint
    }

    /// List all debuggable targets.
    pub async fn list_pages(&self) -> Result<Vec<PageInfo>, CdpError> {
        let url = format!("{}/json/list", self.http_endpoint);
        trace!("Fetching page list from {}", url);
        let response = self.http.get(&url).send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                CdpError::EndpointUnavailable(self.http_endpoint.clone())
            } else {
                CdpError::from(e)
            }
        })?;
        let pages: Vec<PageInfo> = response.error_for_status()?.json().await?;
        Ok(pages)
    }

    /// The page to control, per [`select_page`].
    pub async fn find_page(&self, patterns: &[String]) -> Result<PageInfo, CdpError> {
        let pages = self.list_pages().await?;
        select_page(&pages, patterns)
            .cloned()
            .ok_or_else(|| CdpError::PageNotFound(format!("{} targets listed", pages.len())))
    }

    /// Open a session on `page`'s own socket.
    pub async fn attach(&self, page: &PageInfo) -> Result<PageSession, CdpError> {
        let ws_url = page
            .web_socket_debugger_url
            .as_deref()
            .ok_or_else(|| CdpError::PageNotFound(format!("{} has no debugger URL", page.id)))?;
        debug!(page = %page.id, title = %page.title, "Attaching to page");
        let session = PageSession::connect(ws_url, self.timeout).await?;
        session.enable_domains().await?;
        Ok(session)
    }
}

/// Pick the player page among `pages`.
///
/// A page matches when its URL or title contains one of `patterns`. Without a
/// match the first `page` target is used, then any target with a socket.
pub fn select_page<'a>(pages: &'a [PageInfo], patterns: &[String]) -> Option<&'a PageInfo> {
    let candidates = || pages.iter().filter(|p| p.web_socket_debugger_url.is_some());

    candidates()
        .find(|p| {
            patterns
                .iter()
                .filter(|pat| !pat.is_empty())
                .any(|pat| p.url.contains(pat.as_str()) || p.title.contains(pat.as_str()))
        })
        .or_else(|| candidates().find(|p| p.page_type == "page"))
        .or_else(|| candidates().next())
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
