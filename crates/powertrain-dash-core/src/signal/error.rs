//! Signal feed errors

use thiserror::Error;

/// Errors that can occur while receiving signal messages
#[derive(Error, Debug)]
pub enum SignalError {
    /// Frame is not a valid signal message
    #[error("Failed to decode signal message: {0}")]
    Decode(#[from] serde_json::Error),

    /// Connection could not be opened
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection failed after opening
    #[error("Transport error: {0}")]
    Transport(String),

    /// Peer closed the connection
    #[error("Connection closed by peer")]
    Closed,
}

impl From<tokio_tungstenite::tungstenite::Error> for SignalError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;
        match err {
            WsError::ConnectionClosed | WsError::AlreadyClosed => SignalError::Closed,
            other => SignalError::Transport(other.to_string()),
        }
    }
}
