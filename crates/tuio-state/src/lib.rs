//! TUIO State Engine - Session trackers and frame commits
//!
//! Each profile owns a tracker that stages `set` and `alive` messages for
//! the current burst and applies them atomically on `fseq`:
//! - Cursor tracker (`/tuio/2Dcur`): position only, movement threshold
//! - Object tracker (`/tuio/2Dobj`): pose and kinematics, late-frame rejection
//! - Frame sequencer: lateness test and committed-time bookkeeping
//!
//! Trackers return the events of a commit instead of invoking subscribers,
//! so delivery can happen outside the tracker's critical section.

pub mod cursor;
pub mod object;
pub mod sequence;

pub use cursor::*;
pub use object::*;
pub use sequence::*;
