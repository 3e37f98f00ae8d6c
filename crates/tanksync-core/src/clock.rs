//! Monotonic record timestamps.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Hands out strictly increasing epoch-millisecond timestamps.
///
/// Wall-clock time is used while it moves forward; two stamps taken within
/// the same millisecond (or after the wall clock stepped back) are bumped
/// past the previous one so write order is preserved.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: AtomicI64,
}

impl MonotonicClock {
    pub const fn new() -> Self {
        Self {
            last: AtomicI64::new(0),
        }
    }

    pub fn now_ms(&self) -> i64 {
        self.next_after(Utc::now().timestamp_millis())
    }

    fn next_after(&self, wall_ms: i64) -> i64 {
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let next = wall_ms.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => last = actual,
            }
        }
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn wall_clock_ms() -> i64 {
    Utc::now().timestamp_millis()
}
