//! Plugin runtime errors.

use thiserror::Error;
use ymdeck_inspector::TokenError;
use ymdeck_player::PlayerError;
use ymdeck_protocols::ProtocolError;

/// Errors on the connection to the Stream Deck host.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Gave up after {0} failed connection attempts")]
    RetriesExhausted(u32),

    #[error("Outbound queue closed")]
    QueueClosed,
}

/// Errors raised while handling an event.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Player(#[from] PlayerError),

    #[error(transparent)]
    Token(#[from] TokenError),

    /// No controller is attached to the player page.
    #[error("Player is not connected")]
    NotConnected,

    #[error("Action already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Asset error: {0}")]
    Asset(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Clipboard error: {0}")]
    Clipboard(String),
}
