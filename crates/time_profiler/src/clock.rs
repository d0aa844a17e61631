//! Monotonic time sources

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A monotonic time source.
///
/// Readings must never go backwards; wall-clock adjustments must not affect
/// them.
pub trait Clock {
    /// Current reading.
    fn now(&self) -> Instant;
}

/// The process monotonic clock (`Instant::now`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same reading, so a test can keep one handle and give
/// another to a profiler.
///
/// # Example
///
/// ```rust
/// use time_profiler::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let profiler_clock = clock.clone();
/// let before = profiler_clock.now();
/// clock.advance_ms(10);
/// assert_eq!((profiler_clock.now() - before).as_millis(), 10);
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset_ns: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock reading its origin.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_ns: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Move the clock forward by `ms` whole milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Move the clock forward by `by`. The offset saturates at `u64::MAX`
    /// nanoseconds.
    pub fn advance(&self, by: Duration) {
        let by_ns = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        let _ = self
            .offset_ns
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |ns| {
                Some(ns.saturating_add(by_ns))
            });
    }

    /// Time since the origin, in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.offset_ns.load(Ordering::SeqCst) as f64 / 1_000_000.0
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + Duration::from_nanos(self.offset_ns.load(Ordering::SeqCst))
    }
}

/// Milliseconds from `from` to `to`, saturating at zero.
#[inline]
pub(crate) fn interval_ms(from: Instant, to: Instant) -> f64 {
    to.saturating_duration_since(from).as_nanos() as f64 / 1_000_000.0
}
