//! Shared state handle with change notification

use super::{StateUpdate, VehicleState};
use crate::render::RenderSink;
use std::sync::{Arc, Mutex, MutexGuard};

/// Identifies a subscription so it can be removed later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Inner {
    state: VehicleState,
    subscribers: Vec<(SubscriptionId, Arc<dyn RenderSink>)>,
    next_id: u64,
}

impl Inner {
    fn notify(&self) {
        for (_, sink) in &self.subscribers {
            sink.render(&self.state);
        }
    }
}

/// Cloneable handle to the one vehicle state shared by every producer.
///
/// Every mutation and the notification that follows it run under one lock,
/// so a sink never observes a half-applied update and notifications from
/// different producers never interleave. Sinks must not call back into the
/// handle from `render`.
#[derive(Clone)]
pub struct StateHandle {
    inner: Arc<Mutex<Inner>>,
}

impl Default for StateHandle {
    fn default() -> Self {
        Self::new(VehicleState::default())
    }
}

impl StateHandle {
    /// Wrap an initial state
    pub fn new(state: VehicleState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                state,
                subscribers: Vec::new(),
                next_id: 1,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A sink that panicked mid-render leaves the state itself intact
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a sink. Sinks are notified in registration order.
    pub fn subscribe(&self, sink: impl RenderSink + 'static) -> SubscriptionId {
        let mut inner = self.lock();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        let sink: Arc<dyn RenderSink> = Arc::new(sink);
        inner.subscribers.push((id, sink));
        id
    }

    /// Remove a sink. Returns false if the id was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.lock();
        let before = inner.subscribers.len();
        inner.subscribers.retain(|(sub, _)| *sub != id);
        inner.subscribers.len() != before
    }

    /// Number of registered sinks
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Merge `update` and notify every sink with the post-update state
    pub fn apply(&self, update: &StateUpdate) {
        let mut inner = self.lock();
        inner.state.merge(update);
        inner.notify();
    }

    /// Merge `update` without notifying
    pub fn apply_silent(&self, update: &StateUpdate) {
        self.lock().state.merge(update);
    }

    /// Run `f` against the current state and apply the update it returns,
    /// all under the same lock. Nothing is applied or notified for `None`.
    pub fn apply_with<F>(&self, f: F) -> bool
    where
        F: FnOnce(&VehicleState) -> Option<StateUpdate>,
    {
        let mut inner = self.lock();
        match f(&inner.state) {
            Some(update) => {
                inner.state.merge(&update);
                inner.notify();
                true
            }
            None => false,
        }
    }

    /// Replace the whole record and notify. Subscriptions are kept.
    pub fn replace(&self, state: VehicleState) {
        let mut inner = self.lock();
        inner.state = state;
        inner.notify();
    }

    /// Notify every sink with the current state without changing it
    pub fn refresh(&self) {
        self.lock().notify();
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> VehicleState {
        self.lock().state.clone()
    }
}
