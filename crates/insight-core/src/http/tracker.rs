//! In-flight request registry and slow-request advisory bookkeeping.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

/// Handle for one registered request.
#[derive(Debug, Clone)]
pub struct RequestTicket {
    key: String,
    generation: u64,
    token: CancellationToken,
}

impl RequestTicket {
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Debug)]
struct InFlight {
    generation: u64,
    token: CancellationToken,
}

#[derive(Debug, Default)]
struct TrackerState {
    in_flight: HashMap<String, InFlight>,
    next_generation: u64,
    pending: usize,
    advisory_visible: bool,
}

/// Tracks at most one current request per request-identity key.
///
/// All check-then-set sequences happen under one lock, so callers never
/// observe a half-registered request.
#[derive(Debug, Default)]
pub struct RequestTracker {
    state: Mutex<TrackerState>,
}

impl RequestTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request under `key`, cancelling any in-flight request
    /// that currently owns the key.
    pub fn register(&self, key: &str) -> RequestTicket {
        let mut state = self.lock();
        state.next_generation += 1;
        let generation = state.next_generation;
        let token = CancellationToken::new();

        if let Some(previous) = state.in_flight.insert(
            key.to_string(),
            InFlight {
                generation,
                token: token.clone(),
            },
        ) {
            previous.token.cancel();
            tracing::debug!("Cancelled superseded request {key}");
        }
        state.pending += 1;

        RequestTicket {
            key: key.to_string(),
            generation,
            token,
        }
    }

    /// Mark a request complete.
    ///
    /// The registry entry is removed only when it still belongs to `ticket`.
    /// Returns `true` when the caller must dismiss the visible advisory.
    pub fn finish(&self, ticket: &RequestTicket) -> bool {
        let mut state = self.lock();
        state.pending = state.pending.saturating_sub(1);

        let owns_entry = state
            .in_flight
            .get(&ticket.key)
            .is_some_and(|entry| entry.generation == ticket.generation);
        if owns_entry {
            state.in_flight.remove(&ticket.key);
        }

        if state.advisory_visible && state.pending == 0 {
            state.advisory_visible = false;
            true
        } else {
            false
        }
    }

    /// Claim the advisory singleton. Returns `false` if one is already showing.
    pub fn raise_advisory(&self) -> bool {
        let mut state = self.lock();
        if state.advisory_visible {
            false
        } else {
            state.advisory_visible = true;
            true
        }
    }

    pub fn pending_count(&self) -> usize {
        self.lock().pending
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        self.lock().in_flight.contains_key(key)
    }

    pub fn advisory_visible(&self) -> bool {
        self.lock().advisory_visible
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registering_same_key_cancels_previous() {
        let tracker = RequestTracker::new();
        let first = tracker.register("GET:/notes/u/u1");
        let second = tracker.register("GET:/notes/u/u1");

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert_eq!(tracker.pending_count(), 2);
    }

    #[test]
    fn distinct_keys_do_not_interfere() {
        let tracker = RequestTracker::new();
        let list = tracker.register("GET:/notes/u/u1");
        let create = tracker.register("POST:/notes/create");
        assert!(!list.is_cancelled());
        assert!(!create.is_cancelled());
    }

    #[test]
    fn finishing_superseded_request_keeps_newer_entry() {
        let tracker = RequestTracker::new();
        let first = tracker.register("GET:/auth/profile");
        let second = tracker.register("GET:/auth/profile");

        tracker.finish(&first);
        assert!(tracker.is_in_flight("GET:/auth/profile"));

        tracker.finish(&second);
        assert!(!tracker.is_in_flight("GET:/auth/profile"));
        assert_eq!(tracker.pending_count(), 0);
    }

    #[test]
    fn advisory_is_a_singleton_dismissed_when_idle() {
        let tracker = RequestTracker::new();
        let first = tracker.register("GET:/notes/a");
        let second = tracker.register("GET:/notes/b");

        assert!(tracker.raise_advisory());
        assert!(!tracker.raise_advisory());

        assert!(!tracker.finish(&first));
        assert!(tracker.advisory_visible());
        assert!(tracker.finish(&second));
        assert!(!tracker.advisory_visible());
    }
}
