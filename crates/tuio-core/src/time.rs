//! Time snapshots for the TUIO session clock

use std::ops::{Add, Sub};
use std::time::Duration;

/// Session time - monotonic, microseconds since the session clock started
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TuioTime(pub u64);

impl TuioTime {
    pub const ZERO: TuioTime = TuioTime(0);

    #[inline]
    pub fn from_micros(micros: u64) -> Self {
        TuioTime(micros)
    }

    #[inline]
    pub fn from_millis(millis: u64) -> Self {
        TuioTime(millis.saturating_mul(1000))
    }

    #[inline]
    pub fn from_duration(duration: Duration) -> Self {
        TuioTime(duration.as_micros().min(u64::MAX as u128) as u64)
    }

    #[inline]
    pub fn as_micros(self) -> u64 {
        self.0
    }

    #[inline]
    pub fn as_millis(self) -> u64 {
        self.0 / 1000
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Milliseconds elapsed since `earlier`, zero if `earlier` is in the future
    #[inline]
    pub fn elapsed_millis(self, earlier: TuioTime) -> u64 {
        self.0.saturating_sub(earlier.0) / 1000
    }

    #[inline]
    pub fn saturating_add(self, duration: Duration) -> Self {
        TuioTime(self.0.saturating_add(duration.as_micros().min(u64::MAX as u128) as u64))
    }
}

impl Add<Duration> for TuioTime {
    type Output = TuioTime;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl Sub<TuioTime> for TuioTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: TuioTime) -> Self::Output {
        Duration::from_micros(self.0.saturating_sub(rhs.0))
    }
}

impl std::fmt::Debug for TuioTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t({:.3}ms)", self.0 as f64 / 1000.0)
    }
}
