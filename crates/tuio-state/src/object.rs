//! Object tracker for the `/tuio/2Dobj` profile
//!
//! `set` and `alive` messages become candidate transitions tagged
//! Added/Updated/Removed. On `fseq` the frame sequencer decides whether the
//! frame is late; a late frame discards every candidate, an accepted frame
//! applies them in arrival order and ends with a refresh event.
//!
//! Alive lists are double buffered: `alive` holds the membership of the
//! last committed burst, `next_alive` collects the current one, and the two
//! swap on commit.

use std::collections::BTreeMap;
use std::sync::Arc;

use tuio_core::{ObjectPose, ObjectSet, SessionId, SymbolId, TuioEvent, TuioObject, TuioState, TuioTime};
use tuio_time::Clock;

use crate::{FrameSequencer, FrameVerdict, SequenceConfig};

/// A staged transition
#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    state: TuioState,
    session_id: SessionId,
    symbol_id: SymbolId,
    pose: ObjectPose,
}

/// Result of `ObjectTracker::commit`
#[derive(Clone, Debug, PartialEq)]
pub enum FrameCommit {
    /// Frame applied; `events` ends with `TuioEvent::Refresh(time)`
    Applied {
        frame: i32,
        time: TuioTime,
        events: Vec<TuioEvent>,
    },
    /// Frame rejected as late; nothing was applied
    Late { frame: i32, current: i32 },
}

impl FrameCommit {
    pub fn is_late(&self) -> bool {
        matches!(self, FrameCommit::Late { .. })
    }

    /// Events of an applied frame, empty for a late one
    pub fn into_events(self) -> Vec<TuioEvent> {
        match self {
            FrameCommit::Applied { events, .. } => events,
            FrameCommit::Late { .. } => Vec::new(),
        }
    }
}

/// Live object set plus the candidate transitions of the current burst
pub struct ObjectTracker {
    objects: BTreeMap<SessionId, TuioObject>,
    frame: Vec<Candidate>,
    alive: Vec<SessionId>,
    next_alive: Vec<SessionId>,
    alive_staged: bool,
    sequencer: FrameSequencer,
}

impl ObjectTracker {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_config(clock, SequenceConfig::default())
    }

    pub fn with_config(clock: Arc<dyn Clock>, config: SequenceConfig) -> Self {
        ObjectTracker {
            objects: BTreeMap::new(),
            frame: Vec::with_capacity(32),
            alive: Vec::with_capacity(32),
            next_alive: Vec::with_capacity(32),
            alive_staged: false,
            sequencer: FrameSequencer::new(clock, config),
        }
    }

    /// Stage a `set`. Returns true if a candidate was staged or changed.
    ///
    /// A second `set` for the same session in one burst rewrites the first
    /// candidate in place, so a burst holds at most one per session.
    pub fn stage_set(&mut self, set: ObjectSet) -> bool {
        let live = self.objects.get(&set.session_id);

        if let Some(i) = self
            .frame
            .iter()
            .position(|c| c.session_id == set.session_id && c.state != TuioState::Removed)
        {
            let staged = &mut self.frame[i];
            if staged.pose == set.pose {
                return false;
            }
            if staged.state == TuioState::Updated && live.map(TuioObject::pose) == Some(set.pose) {
                // Back to the live values: nothing left to update
                self.frame.remove(i);
                return true;
            }
            staged.pose = set.pose;
            return true;
        }

        match live {
            None => {
                self.frame.push(Candidate {
                    state: TuioState::Added,
                    session_id: set.session_id,
                    symbol_id: set.symbol_id,
                    pose: set.pose,
                });
                true
            }
            Some(obj) if obj.pose() != set.pose => {
                self.frame.push(Candidate {
                    state: TuioState::Updated,
                    session_id: set.session_id,
                    symbol_id: obj.symbol_id,
                    pose: set.pose,
                });
                true
            }
            Some(_) => false,
        }
    }

    /// Stage membership. Live sessions missing from `ids` are staged for
    /// removal, and sessions added this burst must appear in `ids` to be
    /// committed. The last `alive` of a burst wins.
    pub fn stage_alive(&mut self, ids: &[SessionId]) {
        self.next_alive.clear();
        self.next_alive.extend_from_slice(ids);
        self.alive_staged = true;

        self.frame.retain(|c| c.state != TuioState::Removed);
        for (id, obj) in &self.objects {
            if ids.contains(id) {
                continue;
            }
            self.frame.push(Candidate {
                state: TuioState::Removed,
                session_id: *id,
                symbol_id: obj.symbol_id,
                pose: obj.pose(),
            });
        }
    }

    /// Validate `fseq` and apply the burst atomically
    pub fn commit(&mut self, fseq: i32) -> FrameCommit {
        if let FrameVerdict::Late { current } = self.sequencer.admit(fseq) {
            tracing::debug!(
                frame = fseq,
                current,
                dropped = self.frame.len(),
                "late object frame discarded"
            );
            self.discard_burst();
            return FrameCommit::Late {
                frame: fseq,
                current,
            };
        }

        let time = self.sequencer.current_time();
        let mut events = Vec::with_capacity(self.frame.len() + 1);

        for candidate in self.frame.drain(..) {
            let id = candidate.session_id;
            match candidate.state {
                TuioState::Removed => match self.objects.remove(&id) {
                    Some(mut obj) => {
                        obj.mark_removed(time);
                        events.push(TuioEvent::ObjectRemoved(obj));
                    }
                    None => tracing::trace!(session = %id, "removal of unknown object ignored"),
                },
                TuioState::Added if self.alive_staged && !self.next_alive.contains(&id) => {
                    tracing::trace!(session = %id, "set for a session missing from alive ignored");
                }
                TuioState::Added => {
                    let pose = candidate.pose;
                    let obj = TuioObject::added(id, candidate.symbol_id, pose.x, pose.y, pose.angle, time);
                    self.objects.insert(id, obj);
                    events.push(TuioEvent::ObjectAdded(obj));
                }
                TuioState::Updated => match self.objects.get_mut(&id) {
                    Some(obj) => {
                        let pose = candidate.pose;
                        // Speeds are the incoming ones: a stationary report that moved
                        let nudged = (pose.x != obj.x && pose.x_speed == 0.0)
                            || (pose.y != obj.y && pose.y_speed == 0.0);
                        if nudged {
                            obj.correct_position(pose.x, pose.y, pose.angle, time);
                        } else {
                            obj.apply_pose(&pose, time);
                        }
                        events.push(TuioEvent::ObjectUpdated(*obj));
                    }
                    None => tracing::trace!(session = %id, "update of an object no longer alive ignored"),
                },
            }
        }

        events.push(TuioEvent::Refresh(time));

        if self.alive_staged {
            std::mem::swap(&mut self.alive, &mut self.next_alive);
            self.alive_staged = false;
        }

        let frame = self.sequencer.current_frame();
        tracing::trace!(frame, events = events.len(), live = self.objects.len(), "object frame committed");
        FrameCommit::Applied {
            frame,
            time,
            events,
        }
    }

    fn discard_burst(&mut self) {
        self.frame.clear();
        self.next_alive.clear();
        self.alive_staged = false;
    }

    pub fn object(&self, session_id: SessionId) -> Option<TuioObject> {
        self.objects.get(&session_id).copied()
    }

    /// Live objects in ascending session order
    pub fn objects(&self) -> Vec<TuioObject> {
        self.objects.values().copied().collect()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn contains_symbol(&self, symbol_id: SymbolId) -> bool {
        self.objects.values().any(|o| o.symbol_id == symbol_id)
    }

    /// Live object with the lowest session id carrying `symbol_id`
    pub fn first_with_symbol(&self, symbol_id: SymbolId) -> Option<TuioObject> {
        self.objects.values().find(|o| o.symbol_id == symbol_id).copied()
    }

    /// Session ids of the last committed `alive`
    pub fn alive(&self) -> &[SessionId] {
        &self.alive
    }

    pub fn current_frame(&self) -> i32 {
        self.sequencer.current_frame()
    }

    pub fn current_time(&self) -> TuioTime {
        self.sequencer.current_time()
    }

    /// Number of staged candidates awaiting `fseq`
    pub fn pending(&self) -> usize {
        self.frame.len()
    }
}

impl std::fmt::Debug for ObjectTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectTracker")
            .field("objects", &self.objects.len())
            .field("pending", &self.frame.len())
            .field("alive", &self.alive)
            .field("sequencer", &self.sequencer)
            .finish()
    }
}
