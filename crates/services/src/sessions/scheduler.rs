//! Timed transition from answer feedback to the next question.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;

use super::runtime::SessionEvent;

/// Identifies one pending reveal delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RevealToken(u64);

impl RevealToken {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Fires `RevealElapsed(token)` back into the session after a delay.
///
/// A cancelled token must not fire. The session also ignores tokens it no
/// longer waits for, so a late firing is harmless.
pub trait RevealScheduler: Send + Sync {
    fn schedule(&self, token: RevealToken, delay: Duration);

    fn cancel(&self, token: RevealToken);
}

/// Real-time scheduler backed by tokio timers.
pub struct TokioRevealScheduler {
    events: UnboundedSender<SessionEvent>,
    pending: Arc<Mutex<HashMap<RevealToken, AbortHandle>>>,
}

impl TokioRevealScheduler {
    #[must_use]
    pub fn new(events: UnboundedSender<SessionEvent>) -> Self {
        Self {
            events,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    #[cfg(test)]
    fn pending_len(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl RevealScheduler for TokioRevealScheduler {
    fn schedule(&self, token: RevealToken, delay: Duration) {
        let events = self.events.clone();
        let pending = Arc::clone(&self.pending);
        // Hold the lock while spawning so the task cannot remove its entry before it is inserted.
        let mut guard = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&token);
            if events.send(SessionEvent::RevealElapsed(token)).is_err() {
                tracing::debug!(token = token.value(), "session closed before reveal fired");
            }
        });
        guard.insert(token, task.abort_handle());
    }

    fn cancel(&self, token: RevealToken) {
        let handle = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&token);
        if let Some(handle) = handle {
            handle.abort();
            tracing::debug!(token = token.value(), "cancelled pending reveal");
        }
    }
}

/// Scheduler that never fires on its own; tests release reveals explicitly.
#[derive(Default)]
pub struct ManualRevealScheduler {
    state: Mutex<ManualState>,
}

#[derive(Default)]
struct ManualState {
    pending: Vec<(RevealToken, Duration)>,
    cancelled: Vec<RevealToken>,
}

impl ManualRevealScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens scheduled and not yet taken or cancelled, oldest first.
    #[must_use]
    pub fn pending(&self) -> Vec<RevealToken> {
        self.lock().pending.iter().map(|(token, _)| *token).collect()
    }

    /// Delay requested for `token`, if it is still pending.
    #[must_use]
    pub fn delay_of(&self, token: RevealToken) -> Option<Duration> {
        self.lock()
            .pending
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, delay)| *delay)
    }

    /// Remove and return every pending token, as if their delays had elapsed.
    pub fn take_due(&self) -> Vec<RevealToken> {
        self.lock()
            .pending
            .drain(..)
            .map(|(token, _)| token)
            .collect()
    }

    #[must_use]
    pub fn cancelled(&self) -> Vec<RevealToken> {
        self.lock().cancelled.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RevealScheduler for ManualRevealScheduler {
    fn schedule(&self, token: RevealToken, delay: Duration) {
        self.lock().pending.push((token, delay));
    }

    fn cancel(&self, token: RevealToken) {
        let mut state = self.lock();
        let before = state.pending.len();
        state.pending.retain(|(t, _)| *t != token);
        if state.pending.len() != before {
            state.cancelled.push(token);
        }
    }
}
