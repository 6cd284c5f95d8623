//! Live Signal Ingestion
//!
//! Receives pre-decoded vehicle bus signals from a streaming server and maps
//! them onto the vehicle state. This is a simple JSON convention, not a bus
//! decoder: each message names a message id and carries named numeric
//! signals.

mod client;
mod error;
mod message;
pub mod transport;

pub use client::{
    ConnectionState, SignalClient, SignalStats, DEFAULT_RECONNECT_DELAY, DEFAULT_SIGNAL_URL,
};
pub use error::SignalError;
pub use message::{MessageKind, SignalMessage};
pub use transport::{FrameStream, SignalTransport, WebSocketTransport};
