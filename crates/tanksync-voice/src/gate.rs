//! Worker gate — at most one speech worker runs at a time.
//!
//! Whoever wins `try_acquire` owns the queue until it calls `release`. The
//! flag is shared by clones so the worker task and the enqueue side see the
//! same state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared busy flag for the speech worker.
#[derive(Debug, Clone, Default)]
pub struct WorkerGate {
    busy: Arc<AtomicBool>,
}

impl WorkerGate {
    /// Create a new gate (initially free).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate. Returns `false` if a worker already holds it.
    pub fn try_acquire(&self) -> bool {
        let acquired = self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if acquired {
            tracing::debug!("Worker gate: acquired");
        }
        acquired
    }

    /// Free the gate.
    pub fn release(&self) {
        self.busy.store(false, Ordering::Release);
        tracing::debug!("Worker gate: released");
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}
