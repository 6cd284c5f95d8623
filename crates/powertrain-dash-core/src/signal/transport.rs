//! Transport abstraction for the signal feed
//!
//! The client only needs "open a URL, then read text frames until the peer
//! goes away". [`WebSocketTransport`] provides that over tokio-tungstenite;
//! tests substitute scripted transports.

use super::SignalError;
use futures_util::future::{self, BoxFuture};
use futures_util::stream::{BoxStream, StreamExt};
use tokio_tungstenite::tungstenite::Message;

/// Stream of text payloads from an open connection.
///
/// `Err(SignalError::Closed)` or the end of the stream means the peer closed;
/// any other error is a transport failure. Both end the connection.
pub type FrameStream = BoxStream<'static, Result<String, SignalError>>;

/// Opens connections to a signal source
pub trait SignalTransport: Send + Sync + 'static {
    /// Open a connection. There is no open timeout; a failure surfaces as `Err`.
    fn open(&self, url: &str) -> BoxFuture<'static, Result<FrameStream, SignalError>>;
}

/// WebSocket transport
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketTransport;

impl SignalTransport for WebSocketTransport {
    fn open(&self, url: &str) -> BoxFuture<'static, Result<FrameStream, SignalError>> {
        let url = url.to_string();
        Box::pin(async move {
            let (socket, _response) = tokio_tungstenite::connect_async(url.as_str())
                .await
                .map_err(|e| SignalError::ConnectionFailed(e.to_string()))?;

            let frames = socket.filter_map(|item| future::ready(frame_payload(item)));
            Ok(frames.boxed())
        })
    }
}

/// Reduce a WebSocket frame to a text payload, skipping control frames
fn frame_payload(
    item: Result<Message, tokio_tungstenite::tungstenite::Error>,
) -> Option<Result<String, SignalError>> {
    match item {
        Ok(Message::Text(text)) => Some(Ok(text)),
        Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
            Ok(text) => Some(Ok(text)),
            Err(_) => {
                tracing::warn!("Dropping non UTF-8 binary frame");
                None
            }
        },
        Ok(Message::Close(_)) => Some(Err(SignalError::Closed)),
        Ok(_) => None,
        Err(e) => Some(Err(e.into())),
    }
}
