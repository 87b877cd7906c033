//! Frame sequence validation
//!
//! A frame is late when its `fseq` regresses behind the last committed
//! frame by no more than the wraparound window. A larger regression is
//! taken as a sender restart or counter wrap and accepted.

use std::sync::Arc;
use std::time::Duration;

use tuio_core::TuioTime;
use tuio_time::Clock;

/// Default maximum regression still treated as a late frame
pub const LATE_FRAME_WINDOW: i32 = 100;

/// Default interval between time refreshes when the sender disables sequencing
pub const TIME_REFRESH_INTERVAL: Duration = Duration::from_millis(100);

/// Sequencer configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SequenceConfig {
    /// Regressions up to this many frames are late; larger ones reset the sequence
    pub late_frame_window: i32,
    /// With `fseq <= 0`, the committed time is refreshed at most this often
    pub time_refresh_interval: Duration,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        SequenceConfig {
            late_frame_window: LATE_FRAME_WINDOW,
            time_refresh_interval: TIME_REFRESH_INTERVAL,
        }
    }
}

/// Outcome of the lateness test
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameVerdict {
    Accepted,
    Late { current: i32 },
}

/// Tracks the committed frame number and committed time of one profile
pub struct FrameSequencer {
    clock: Arc<dyn Clock>,
    current_frame: i32,
    current_time: TuioTime,
    config: SequenceConfig,
}

impl FrameSequencer {
    pub fn new(clock: Arc<dyn Clock>, config: SequenceConfig) -> Self {
        let current_time = clock.now();
        FrameSequencer {
            clock,
            current_frame: 0,
            current_time,
            config,
        }
    }

    /// Run the lateness test for `fseq`, updating frame and time on acceptance
    pub fn admit(&mut self, fseq: i32) -> FrameVerdict {
        if fseq > 0 {
            if fseq > self.current_frame {
                self.current_time = self.clock.now();
            }

            let regression = self.current_frame as i64 - fseq as i64;
            if fseq >= self.current_frame || regression > self.config.late_frame_window as i64 {
                self.current_frame = fseq;
                FrameVerdict::Accepted
            } else {
                FrameVerdict::Late {
                    current: self.current_frame,
                }
            }
        } else {
            let now = self.clock.now();
            if now - self.current_time > self.config.time_refresh_interval {
                self.current_time = now;
            }
            FrameVerdict::Accepted
        }
    }

    /// Last accepted frame number
    pub fn current_frame(&self) -> i32 {
        self.current_frame
    }

    /// Time snapshot of the last committed frame
    pub fn current_time(&self) -> TuioTime {
        self.current_time
    }

    pub fn config(&self) -> SequenceConfig {
        self.config
    }
}

impl std::fmt::Debug for FrameSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSequencer")
            .field("current_frame", &self.current_frame)
            .field("current_time", &self.current_time)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuio_time::ManualClock;

    fn sequencer() -> (Arc<ManualClock>, FrameSequencer) {
        let clock = Arc::new(ManualClock::new());
        let seq = FrameSequencer::new(clock.clone(), SequenceConfig::default());
        (clock, seq)
    }

    #[test]
    fn test_forward_frames_accepted() {
        let (clock, mut seq) = sequencer();

        clock.advance(Duration::from_millis(5));
        assert_eq!(seq.admit(1), FrameVerdict::Accepted);
        assert_eq!(seq.current_time(), TuioTime::from_millis(5));

        // Repeated frame number is accepted without a new time snapshot
        clock.advance(Duration::from_millis(5));
        assert_eq!(seq.admit(1), FrameVerdict::Accepted);
        assert_eq!(seq.current_time(), TuioTime::from_millis(5));
        assert_eq!(seq.current_frame(), 1);
    }

    #[test]
    fn test_small_regression_is_late() {
        let (_clock, mut seq) = sequencer();

        seq.admit(50);
        assert_eq!(seq.admit(49), FrameVerdict::Late { current: 50 });
        assert_eq!(seq.admit(1), FrameVerdict::Late { current: 50 });
        assert_eq!(seq.current_frame(), 50);
    }

    #[test]
    fn test_large_regression_resets() {
        let (_clock, mut seq) = sequencer();

        seq.admit(500);
        assert_eq!(seq.admit(400), FrameVerdict::Late { current: 500 });
        assert_eq!(seq.admit(10), FrameVerdict::Accepted);
        assert_eq!(seq.current_frame(), 10);
    }

    #[test]
    fn test_unsequenced_frames_refresh_time_slowly() {
        let (clock, mut seq) = sequencer();

        clock.advance(Duration::from_millis(50));
        assert_eq!(seq.admit(0), FrameVerdict::Accepted);
        assert_eq!(seq.current_time(), TuioTime::ZERO);

        clock.advance(Duration::from_millis(51));
        assert_eq!(seq.admit(0), FrameVerdict::Accepted);
        assert_eq!(seq.current_time(), TuioTime::from_millis(101));
        assert_eq!(seq.current_frame(), 0);
    }

    #[test]
    fn test_extreme_frame_numbers_do_not_overflow() {
        let (_clock, mut seq) = sequencer();

        assert_eq!(seq.admit(i32::MAX), FrameVerdict::Accepted);
        assert_eq!(seq.admit(1), FrameVerdict::Accepted);
        assert_eq!(seq.admit(i32::MIN), FrameVerdict::Accepted);
    }
}
