//! Clock implementations for the TUIO session

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tuio_core::TuioTime;

/// Source of session time snapshots
pub trait Clock: Send + Sync {
    /// Current session time
    fn now(&self) -> TuioTime;
}

/// Milliseconds elapsed from `earlier` to `later`, never negative
#[inline]
pub fn elapsed_millis(earlier: TuioTime, later: TuioTime) -> u64 {
    later.elapsed_millis(earlier)
}

/// Monotonic clock backed by the OS, zero at construction
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    reference: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            reference: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> TuioTime {
        TuioTime::from_duration(self.reference.elapsed())
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    micros: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(time: TuioTime) -> Self {
        ManualClock {
            micros: AtomicU64::new(time.as_micros()),
        }
    }

    pub fn set(&self, time: TuioTime) {
        self.micros.store(time.as_micros(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) -> TuioTime {
        let by = by.as_micros().min(u64::MAX as u128) as u64;
        let prev = self.micros.fetch_add(by, Ordering::SeqCst);
        TuioTime::from_micros(prev.saturating_add(by))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> TuioTime {
        TuioTime::from_micros(self.micros.load(Ordering::SeqCst))
    }
}
