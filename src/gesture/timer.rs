//! Deferred actions with cancel tokens.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Shared cancellation flag; clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// An action that becomes due at `deadline` unless cancelled first.
#[derive(Debug, Clone)]
pub struct PendingTimer {
    deadline: Instant,
    token: CancelToken,
}

impl PendingTimer {
    pub fn new(deadline: Instant) -> Self {
        Self {
            deadline,
            token: CancelToken::new(),
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        !self.is_cancelled() && now >= self.deadline
    }
}

/// Sleeps until the timer's deadline and runs `f` unless it was cancelled.
///
/// Returns whether `f` ran. Hosts that drive the resolver from a tokio
/// runtime use this instead of polling.
pub async fn run_deferred<F: FnOnce()>(timer: PendingTimer, f: F) -> bool {
    tokio::time::sleep_until(tokio::time::Instant::from_std(timer.deadline)).await;
    if timer.is_cancelled() {
        return false;
    }
    f();
    true
}
