//! Inspector error types.

use thiserror::Error;
use ymdeck_protocols::ProtocolError;

/// Token validation failures. A definite "not valid" answer is `Ok(false)`,
/// not an error.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid check URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Remote validation failed: {0}")]
    RemoteValidation(String),
}

impl From<reqwest::Error> for TokenError {
    fn from(err: reqwest::Error) -> Self {
        TokenError::RemoteValidation(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum InspectorError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Connection to host closed")]
    Closed,
}
