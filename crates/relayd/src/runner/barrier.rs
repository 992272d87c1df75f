//! Completion barrier joining the foreground listener tasks.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// Counter that releases waiters once every entered task has signalled.
///
/// Each [`CompletionToken`] signals when dropped, so a task that panics still
/// releases its slot.
#[derive(Debug, Clone, Default)]
pub struct CompletionBarrier {
    inner: Arc<BarrierState>,
}

#[derive(Debug, Default)]
struct BarrierState {
    pending: Mutex<usize>,
    released: Condvar,
}

impl BarrierState {
    fn pending(&self) -> MutexGuard<'_, usize> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CompletionBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one task and returns the token it must drop on exit.
    pub fn enter(&self) -> CompletionToken {
        *self.inner.pending() += 1;
        CompletionToken {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of tasks that have not yet signalled.
    pub fn pending(&self) -> usize {
        *self.inner.pending()
    }

    /// Blocks until every entered task has signalled. There is no timeout.
    pub fn wait(&self) {
        let mut pending = self.inner.pending();
        while *pending > 0 {
            pending = self
                .inner
                .released
                .wait(pending)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

/// Proof of one registered task; signals the barrier when dropped.
#[derive(Debug)]
#[must_use = "dropping the token signals completion immediately"]
pub struct CompletionToken {
    inner: Arc<BarrierState>,
}

impl Drop for CompletionToken {
    fn drop(&mut self) {
        let mut pending = self.inner.pending();
        *pending = pending.saturating_sub(1);
        if *pending == 0 {
            self.inner.released.notify_all();
        }
    }
}
