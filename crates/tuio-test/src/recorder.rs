//! Recording listener

use parking_lot::Mutex;

use tuio_core::{EventKind, TuioEvent};
use tuio_runtime::TuioListener;

/// Stores every event it receives, in delivery order
#[derive(Debug, Default)]
pub struct RecordingListener {
    events: Mutex<Vec<TuioEvent>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TuioEvent> {
        self.events.lock().clone()
    }

    /// Drain recorded events
    pub fn take(&self) -> Vec<TuioEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().iter().map(TuioEvent::kind).collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl TuioListener for RecordingListener {
    fn on_event(&self, event: &TuioEvent) {
        self.events.lock().push(event.clone());
    }
}
