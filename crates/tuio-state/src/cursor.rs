//! Cursor tracker for the `/tuio/2Dcur` profile
//!
//! Cursors carry a position only. A `set` is staged when the cursor moved
//! at least the movement threshold; `alive` decides which staged cursors
//! enter the live set and which live cursors leave it. Every `fseq` is
//! committed, there is no lateness test for this profile.

use std::collections::BTreeMap;

use tuio_core::{SessionId, TuioCursor, TuioEvent};

/// Live cursor set plus the staging lists of the current burst
#[derive(Debug, Default)]
pub struct CursorTracker {
    /// Live cursors indexed by session
    cursors: BTreeMap<SessionId, TuioCursor>,
    /// Cursors whose position changed beyond the threshold this burst
    updated: Vec<TuioCursor>,
    /// Sessions newly declared alive this burst
    added: Vec<SessionId>,
    /// Live sessions missing from this burst's alive list
    removed: Vec<SessionId>,
    movement_threshold: f32,
    movement_threshold_sq: f32,
    frame_number: i32,
}

impl CursorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_movement_threshold(threshold: f32) -> Self {
        let mut tracker = Self::new();
        tracker.set_movement_threshold(threshold);
        tracker
    }

    /// Minimum displacement for a `set` to count as movement; 0 accepts every `set`
    pub fn set_movement_threshold(&mut self, threshold: f32) {
        self.movement_threshold = threshold;
        self.movement_threshold_sq = threshold * threshold;
    }

    pub fn movement_threshold(&self) -> f32 {
        self.movement_threshold
    }

    /// Stage a position. Returns true if the move passed the threshold.
    ///
    /// Displacement is measured from the cursor's last known position: the
    /// pose already staged this burst, else the live pose, else the origin.
    pub fn stage_set(&mut self, session_id: SessionId, x: f32, y: f32) -> bool {
        let staged = self.updated.iter().position(|c| c.session_id == session_id);
        let last = match staged {
            Some(i) => self.updated[i],
            None => self
                .cursors
                .get(&session_id)
                .copied()
                .unwrap_or_else(|| TuioCursor::new(session_id, 0.0, 0.0)),
        };

        if last.distance_sq(x, y) < self.movement_threshold_sq {
            return false;
        }

        let cursor = TuioCursor::new(session_id, x, y);
        match staged {
            Some(i) => self.updated[i] = cursor,
            None => self.updated.push(cursor),
        }
        true
    }

    /// Stage membership: diff `ids` against the live set
    pub fn stage_alive(&mut self, ids: &[SessionId]) {
        for id in self.cursors.keys() {
            if !ids.contains(id) && !self.removed.contains(id) {
                self.removed.push(*id);
            }
        }
        for id in ids {
            if !self.cursors.contains_key(id) && !self.added.contains(id) {
                self.added.push(*id);
            }
        }
    }

    /// Apply the burst and return its events in commit order
    pub fn commit(&mut self, frame_number: i32) -> Vec<TuioEvent> {
        self.frame_number = frame_number;

        let mut events = Vec::with_capacity(self.updated.len() + self.removed.len());

        for cursor in self.updated.drain(..) {
            let id = cursor.session_id;
            if self.added.contains(&id) && !self.cursors.contains_key(&id) {
                self.cursors.insert(id, cursor);
                events.push(TuioEvent::CursorAdded(cursor));
            } else {
                if let Some(live) = self.cursors.get_mut(&id) {
                    *live = cursor;
                } else {
                    tracing::trace!(session = %id, "cursor update for a session that is not alive");
                }
                events.push(TuioEvent::CursorUpdated(cursor));
            }
        }

        for id in self.removed.drain(..) {
            if let Some(cursor) = self.cursors.remove(&id) {
                events.push(TuioEvent::CursorRemoved(cursor));
            }
        }

        self.added.clear();

        tracing::trace!(
            frame = frame_number,
            events = events.len(),
            live = self.cursors.len(),
            "cursor frame committed"
        );
        events
    }

    /// Frame number of the last commit
    pub fn frame_number(&self) -> i32 {
        self.frame_number
    }

    pub fn cursor(&self, session_id: SessionId) -> Option<TuioCursor> {
        self.cursors.get(&session_id).copied()
    }

    /// Live cursors in ascending session order
    pub fn cursors(&self) -> Vec<TuioCursor> {
        self.cursors.values().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }

    /// True while staged changes await a commit
    pub fn has_pending(&self) -> bool {
        !(self.updated.is_empty() && self.added.is_empty() && self.removed.is_empty())
    }
}
