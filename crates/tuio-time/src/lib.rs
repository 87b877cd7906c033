//! TUIO Time - Session clock
//!
//! The trackers only need two things from time: a comparable snapshot of
//! "now" and the elapsed milliseconds between two snapshots. Both are
//! non-blocking and safe to call from the message-processing path.

pub mod clock;

pub use clock::*;
