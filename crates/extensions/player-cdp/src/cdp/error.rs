//! Failures talking to the desktop client's DevTools endpoint.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CdpError {
    /// The page socket could not be opened.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Nothing is listening on the debugging port.
    #[error("DevTools endpoint not available at {0}. Start the client with --remote-debugging-port")]
    EndpointUnavailable(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// The page answered a command with an `error` object.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// `/json/list` discovery failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The client is up but no player page is open.
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// A page-side script threw.
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Session closed")]
    SessionClosed,
}

impl CdpError {
    /// The remote object or execution context behind a call no longer exists.
    pub fn is_stale_object(&self) -> bool {
        match self {
            CdpError::Protocol { message, .. } => {
                message.contains("Could not find object")
                    || message.contains("Cannot find context")
                    || message.contains("Invalid remote object id")
            }
            _ => false,
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}

impl From<url::ParseError> for CdpError {
    fn from(e: url::ParseError) -> Self {
        CdpError::ConnectionFailed(format!("Invalid URL: {}", e))
    }
}
