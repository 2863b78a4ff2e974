//! Cancellation token handed to every secret getter

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;

/// Cancellable execution context for secret resolution
///
/// The engine never imposes a deadline itself. Callers that want to bound
/// the whole fallback chain create one token with a deadline and pass it
/// to `resolve`; sources check it cooperatively.
///
/// A token is cancelled either explicitly through [`cancel`](Self::cancel)
/// or implicitly once its deadline has passed.
#[derive(Clone)]
pub struct CancellationToken {
    inner: Arc<CancellationTokenInner>,
    deadline: Option<Instant>,
}

struct CancellationTokenInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken {
    /// Create a new cancellation token without a deadline
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CancellationTokenInner {
                cancelled: AtomicBool::new(false),
                notify: Notify::new(),
            }),
            deadline: None,
        }
    }

    /// Create a token that expires at `deadline`
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            ..Self::new()
        }
    }

    /// Create a token that expires `timeout` from now
    ///
    /// A timeout too large to represent as an `Instant` means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => Self::with_deadline(deadline),
            None => Self::new(),
        }
    }

    /// Check if cancellation has been requested or the deadline has passed
    pub fn is_cancelled(&self) -> bool {
        if self.inner.cancelled.load(Ordering::SeqCst) {
            return true;
        }
        matches!(self.deadline, Some(deadline) if Instant::now() >= deadline)
    }

    /// Request cancellation
    ///
    /// Cancelling a child cancels the parent and every sibling as well,
    /// since they share the same state.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    /// The deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` when there is no deadline
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Derive a token bounded by an additional timeout
    ///
    /// The child observes explicit cancellation of the parent and keeps
    /// whichever deadline comes first. An unrepresentable timeout adds no
    /// bound of its own.
    pub fn child_with_timeout(&self, timeout: Duration) -> CancellationToken {
        let deadline = match (self.deadline, Instant::now().checked_add(timeout)) {
            (Some(current), Some(candidate)) => Some(current.min(candidate)),
            (current, None) => current,
            (None, candidate) => candidate,
        };
        Self {
            inner: Arc::clone(&self.inner),
            deadline,
        }
    }

    /// Wait until cancellation is requested or the deadline passes
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }

        let notified = self.inner.notify.notified();
        let mut notified = std::pin::pin!(notified);
        // Register interest before re-checking, otherwise a concurrent
        // cancel() between the check and the await would be lost.
        notified.as_mut().enable();
        if self.inner.cancelled.load(Ordering::SeqCst) {
            return;
        }

        match self.deadline {
            Some(deadline) => {
                let sleep = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline));
                tokio::select! {
                    _ = notified => {}
                    _ = sleep => {}
                }
            }
            None => notified.await,
        }
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("is_cancelled", &self.is_cancelled())
            .field("deadline", &self.deadline)
            .finish()
    }
}
