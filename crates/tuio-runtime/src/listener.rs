//! Event dispatch to registered listeners
//!
//! Listeners are called synchronously, in registration order, with the
//! events of one committed frame. A listener that panics is isolated: the
//! remaining listeners still receive the event and are told about the
//! failure through `TuioListener::error`.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;

use tuio_core::{TuioCursor, TuioError, TuioEvent, TuioObject, TuioTime};

/// Callback-style subscriber. Every method defaults to a no-op.
///
/// Callbacks run on the receive path, so a slow listener stalls frame
/// processing for its profile. Queries on the server are safe from inside
/// a callback; feeding messages back into the server is not.
pub trait TuioListener: Send + Sync {
    fn add_cursor(&self, _cursor: &TuioCursor) {}
    fn update_cursor(&self, _cursor: &TuioCursor) {}
    fn remove_cursor(&self, _cursor: &TuioCursor) {}

    fn add_object(&self, _object: &TuioObject) {}
    fn update_object(&self, _object: &TuioObject) {}
    fn remove_object(&self, _object: &TuioObject) {}

    /// End of a committed object frame
    fn refresh(&self, _time: TuioTime) {}

    /// Relayed transport failure or a failing sibling listener
    fn error(&self, _error: &TuioError) {}

    /// Route one event to the matching callback
    fn on_event(&self, event: &TuioEvent) {
        match event {
            TuioEvent::CursorAdded(c) => self.add_cursor(c),
            TuioEvent::CursorUpdated(c) => self.update_cursor(c),
            TuioEvent::CursorRemoved(c) => self.remove_cursor(c),
            TuioEvent::ObjectAdded(o) => self.add_object(o),
            TuioEvent::ObjectUpdated(o) => self.update_object(o),
            TuioEvent::ObjectRemoved(o) => self.remove_object(o),
            TuioEvent::Refresh(t) => self.refresh(*t),
            TuioEvent::Error(e) => self.error(e),
        }
    }
}

/// Registration handle
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

impl fmt::Debug for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({})", self.0)
    }
}

type Entry = (ListenerId, Arc<dyn TuioListener>);

/// Ordered listener registry
pub struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: RwLock<Vec<Entry>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn register(&self, listener: Arc<dyn TuioListener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, listener));
        tracing::debug!(listener = id.0, "listener registered");
        id
    }

    /// Returns false if `id` was not registered
    pub fn unregister(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(entry, _)| *entry != id);
        before != listeners.len()
    }

    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }

    /// Deliver `events` in order to every listener registered at call time
    pub fn dispatch(&self, events: &[TuioEvent]) {
        if events.is_empty() {
            return;
        }

        // Registration changes during delivery apply from the next dispatch
        let snapshot: Vec<Entry> = self.listeners.read().clone();

        for event in events {
            let mut failures = Vec::new();
            for (id, listener) in &snapshot {
                if let Err(payload) = catch_unwind(AssertUnwindSafe(|| listener.on_event(event))) {
                    let message = panic_message(payload.as_ref());
                    tracing::warn!(
                        listener = id.0,
                        event = ?event.kind(),
                        %message,
                        "listener panicked"
                    );
                    failures.push((*id, message));
                }
            }

            for (failed, message) in failures {
                let report = TuioEvent::Error(TuioError::Listener {
                    id: failed.0,
                    message,
                });
                for (id, listener) in snapshot.iter().filter(|(id, _)| *id != failed) {
                    if catch_unwind(AssertUnwindSafe(|| listener.on_event(&report))).is_err() {
                        tracing::warn!(listener = id.0, "listener panicked while handling an error report");
                    }
                }
            }
        }
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<ListenerId> = self.listeners.read().iter().map(|(id, _)| *id).collect();
        f.debug_struct("ListenerRegistry").field("listeners", &ids).finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Pull-style subscriber: forwards every event into an unbounded channel
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<TuioEvent>,
}

impl ChannelListener {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TuioEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl TuioListener for ChannelListener {
    fn on_event(&self, event: &TuioEvent) {
        if self.tx.send(event.clone()).is_err() {
            tracing::trace!("event channel closed, dropping event");
        }
    }
}
