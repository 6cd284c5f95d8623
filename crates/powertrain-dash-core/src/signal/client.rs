//! Reconnecting signal client

use super::transport::{SignalTransport, WebSocketTransport};
use super::{SignalError, SignalMessage};
use crate::state::StateHandle;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Default signal feed address
pub const DEFAULT_SIGNAL_URL: &str = "ws://localhost:8080/can-data";

/// Fixed delay before each reconnect attempt. No backoff, no retry limit.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// No connection; a reconnect may be pending
    Disconnected,
    /// Opening a connection
    Connecting,
    /// Connected and receiving messages
    Connected,
}

/// Message counters for the current client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalStats {
    /// Messages that produced a state update
    pub applied: u64,
    /// Well-formed messages with nothing to map
    pub ignored: u64,
    /// Frames that failed to decode
    pub decode_errors: u64,
    /// Connection attempts, including the first
    pub attempts: u64,
}

struct Status {
    connection: ConnectionState,
    reconnect_pending: bool,
    stats: SignalStats,
    /// Bumped on every connect/disconnect so a superseded supervisor
    /// cannot overwrite the status of its successor
    generation: u64,
}

#[derive(Clone)]
struct Shared {
    state: StateHandle,
    transport: Arc<dyn SignalTransport>,
    reconnect_delay: Duration,
    status: Arc<Mutex<Status>>,
}

impl Shared {
    fn status(&self) -> MutexGuard<'_, Status> {
        self.status.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn update(&self, generation: u64, f: impl FnOnce(&mut Status)) -> bool {
        let mut status = self.status();
        if status.generation != generation {
            return false;
        }
        f(&mut status);
        true
    }

    async fn supervise(self, url: String, generation: u64, cancel: CancellationToken) {
        loop {
            let live = self.update(generation, |s| {
                s.connection = ConnectionState::Connecting;
                s.stats.attempts += 1;
            });
            if !live {
                break;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = self.run_connection(&url, generation) => {}
            }

            self.update(generation, |s| {
                s.connection = ConnectionState::Disconnected;
                s.reconnect_pending = true;
            });
            tracing::debug!(delay = ?self.reconnect_delay, "Signal reconnect scheduled");

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
            tracing::info!(%url, "Reconnecting to signal server");
        }

        self.update(generation, |s| {
            s.connection = ConnectionState::Disconnected;
            s.reconnect_pending = false;
        });
    }

    async fn run_connection(&self, url: &str, generation: u64) {
        let mut frames = match self.transport.open(url).await {
            Ok(frames) => frames,
            Err(e) => {
                tracing::warn!(%url, error = %e, "Signal connection failed");
                return;
            }
        };

        self.update(generation, |s| {
            s.connection = ConnectionState::Connected;
            s.reconnect_pending = false;
        });
        tracing::info!(%url, "Signal connection established");

        while let Some(frame) = frames.next().await {
            match frame {
                Ok(text) => self.handle_frame(&text, generation),
                Err(SignalError::Closed) => break,
                Err(e) => {
                    tracing::warn!(%url, error = %e, "Signal connection error");
                    break;
                }
            }
        }

        tracing::info!(%url, "Signal connection closed");
    }

    fn handle_frame(&self, text: &str, generation: u64) {
        let message = match SignalMessage::decode(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "Dropping undecodable signal message");
                self.update(generation, |s| s.stats.decode_errors += 1);
                return;
            }
        };

        let update = message.to_update();
        if update.is_empty() {
            tracing::debug!(message_id = %message.message_id, "Ignoring signal message");
            self.update(generation, |s| s.stats.ignored += 1);
            return;
        }

        self.state.apply(&update);
        self.update(generation, |s| s.stats.applied += 1);
    }
}

struct Session {
    url: String,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Live signal feed that keeps a [`StateHandle`] up to date.
///
/// [`connect`](Self::connect) spawns one supervisor task that opens the
/// connection, applies each decoded message as a single state update and,
/// whenever the connection fails or closes, waits the reconnect delay before
/// trying again. One supervisor means at most one pending reconnect.
pub struct SignalClient {
    shared: Shared,
    session: Option<Session>,
}

impl SignalClient {
    /// Client over WebSocket
    pub fn new(state: StateHandle) -> Self {
        Self::with_transport(state, WebSocketTransport)
    }

    /// Client over a custom transport
    pub fn with_transport(state: StateHandle, transport: impl SignalTransport) -> Self {
        Self {
            shared: Shared {
                state,
                transport: Arc::new(transport),
                reconnect_delay: DEFAULT_RECONNECT_DELAY,
                status: Arc::new(Mutex::new(Status {
                    connection: ConnectionState::Disconnected,
                    reconnect_pending: false,
                    stats: SignalStats::default(),
                    generation: 0,
                })),
            },
            session: None,
        }
    }

    /// Override the reconnect delay. Takes effect on the next `connect`.
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.shared.reconnect_delay = delay;
        self
    }

    /// Delay before each reconnect attempt
    pub fn reconnect_delay(&self) -> Duration {
        self.shared.reconnect_delay
    }

    /// Start feeding from `url`, replacing any existing connection.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect(&mut self, url: &str) {
        let generation = self.end_session();
        let cancel = CancellationToken::new();

        tracing::info!(%url, "Connecting to signal server");
        let task = tokio::spawn(self.shared.clone().supervise(
            url.to_string(),
            generation,
            cancel.clone(),
        ));

        self.session = Some(Session {
            url: url.to_string(),
            cancel,
            task,
        });
    }

    /// Close the connection and cancel any pending reconnect. Idempotent.
    pub fn disconnect(&mut self) {
        let had_session = self.session.is_some();
        self.end_session();
        if had_session {
            tracing::info!("Disconnected from signal server");
        }
    }

    /// Cancel the current supervisor and start a new status generation
    fn end_session(&mut self) -> u64 {
        if let Some(session) = self.session.take() {
            session.cancel.cancel();
            session.task.abort();
        }

        let mut status = self.shared.status();
        status.generation += 1;
        status.connection = ConnectionState::Disconnected;
        status.reconnect_pending = false;
        status.generation
    }

    /// Current connection state
    pub fn connection_state(&self) -> ConnectionState {
        self.shared.status().connection
    }

    /// True while waiting out the reconnect delay (or retrying after it)
    pub fn reconnect_pending(&self) -> bool {
        self.shared.status().reconnect_pending
    }

    /// Message counters since the client was created
    pub fn stats(&self) -> SignalStats {
        self.shared.status().stats
    }

    /// URL of the active session, if any
    pub fn url(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.url.as_str())
    }

    /// True between `connect` and `disconnect`
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }
}

impl Drop for SignalClient {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.cancel.cancel();
            session.task.abort();
        }
    }
}
