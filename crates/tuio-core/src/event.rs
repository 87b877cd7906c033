//! Events delivered to subscribers
//!
//! Trackers produce the entity and refresh events of a committed frame in
//! commit order; the server adds `Error` for failures relayed from the
//! transport or from misbehaving listeners.

use crate::{Profile, SessionId, TuioCursor, TuioError, TuioObject, TuioTime};

/// Event kind, independent of payload
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Added,
    Updated,
    Removed,
    Refresh,
    Error,
}

/// A notification carrying an immutable snapshot
#[derive(Clone, Debug, PartialEq)]
pub enum TuioEvent {
    CursorAdded(TuioCursor),
    CursorUpdated(TuioCursor),
    CursorRemoved(TuioCursor),
    ObjectAdded(TuioObject),
    ObjectUpdated(TuioObject),
    ObjectRemoved(TuioObject),
    /// End of a committed object frame
    Refresh(TuioTime),
    Error(TuioError),
}

impl TuioEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            TuioEvent::CursorAdded(_) | TuioEvent::ObjectAdded(_) => EventKind::Added,
            TuioEvent::CursorUpdated(_) | TuioEvent::ObjectUpdated(_) => EventKind::Updated,
            TuioEvent::CursorRemoved(_) | TuioEvent::ObjectRemoved(_) => EventKind::Removed,
            TuioEvent::Refresh(_) => EventKind::Refresh,
            TuioEvent::Error(_) => EventKind::Error,
        }
    }

    /// Profile of the entity carried by the event, if any
    pub fn profile(&self) -> Option<Profile> {
        match self {
            TuioEvent::CursorAdded(_) | TuioEvent::CursorUpdated(_) | TuioEvent::CursorRemoved(_) => {
                Some(Profile::Cursor2D)
            }
            TuioEvent::ObjectAdded(_)
            | TuioEvent::ObjectUpdated(_)
            | TuioEvent::ObjectRemoved(_)
            | TuioEvent::Refresh(_) => Some(Profile::Object2D),
            TuioEvent::Error(_) => None,
        }
    }

    pub fn session_id(&self) -> Option<SessionId> {
        match self {
            TuioEvent::CursorAdded(c) | TuioEvent::CursorUpdated(c) | TuioEvent::CursorRemoved(c) => {
                Some(c.session_id)
            }
            TuioEvent::ObjectAdded(o) | TuioEvent::ObjectUpdated(o) | TuioEvent::ObjectRemoved(o) => {
                Some(o.session_id)
            }
            TuioEvent::Refresh(_) | TuioEvent::Error(_) => None,
        }
    }
}
