//! TUIO server: routing, per-profile commits and the query surface
//!
//! Each profile is a `Lane`: the tracker behind a short-lived mutex, plus a
//! delivery mutex held from commit until every listener has seen the
//! frame. Holding the delivery lock keeps one profile's frames in commit
//! order, while the tracker lock is already released so listeners can
//! query the server from inside a callback. The two profiles share no lock.

use std::net::SocketAddr;
use std::sync::Arc;

use parking_lot::Mutex;

use tuio_core::{SessionId, SymbolId, TuioCursor, TuioError, TuioEvent, TuioObject, TuioResult, TuioTime};
use tuio_osc::{OscMessage, OscPacket};
use tuio_state::{CursorTracker, FrameCommit, ObjectTracker};
use tuio_time::{Clock, SystemClock};
use tuio_transport::{spawn_receive_loop, ReceiveLoop, UdpReceiver};

use crate::{
    parse_message, ChannelListener, CursorCommand, ListenerId, ListenerRegistry, ObjectCommand, ServerConfig,
    TuioCommand, TuioListener,
};

struct Lane<T> {
    tracker: Mutex<T>,
    delivery: Mutex<()>,
}

impl<T> Lane<T> {
    fn new(tracker: T) -> Self {
        Self {
            tracker: Mutex::new(tracker),
            delivery: Mutex::new(()),
        }
    }
}

struct Shared {
    cursors: Lane<CursorTracker>,
    objects: Lane<ObjectTracker>,
    listeners: ListenerRegistry,
}

impl Shared {
    fn process_packet(&self, packet: OscPacket) {
        for msg in packet.into_messages() {
            self.process_message(&msg);
        }
    }

    fn process_message(&self, msg: &OscMessage) {
        match parse_message(msg) {
            Ok(Some(TuioCommand::Cursor(cmd))) => self.apply_cursor(cmd),
            Ok(Some(TuioCommand::Object(cmd))) => self.apply_object(cmd),
            Ok(None) => tracing::trace!(address = %msg.address, "ignoring message"),
            Err(e) => tracing::trace!(address = %msg.address, error = %e, "dropping malformed message"),
        }
    }

    fn apply_cursor(&self, cmd: CursorCommand) {
        match cmd {
            CursorCommand::Set { session_id, x, y } => {
                self.cursors.tracker.lock().stage_set(session_id, x, y);
            }
            CursorCommand::Alive(ids) => self.cursors.tracker.lock().stage_alive(&ids),
            CursorCommand::Fseq(frame) => {
                let _delivery = self.cursors.delivery.lock();
                let events = self.cursors.tracker.lock().commit(frame);
                self.listeners.dispatch(&events);
            }
        }
    }

    fn apply_object(&self, cmd: ObjectCommand) {
        match cmd {
            ObjectCommand::Set(set) => {
                self.objects.tracker.lock().stage_set(set);
            }
            ObjectCommand::Alive(ids) => self.objects.tracker.lock().stage_alive(&ids),
            ObjectCommand::Fseq(fseq) => {
                let _delivery = self.objects.delivery.lock();
                let commit = self.objects.tracker.lock().commit(fseq);
                if let FrameCommit::Applied { frame, time, events } = commit {
                    tracing::debug!(frame, ?time, events = events.len(), "object frame committed");
                    self.listeners.dispatch(&events);
                }
            }
        }
    }

    fn report_error(&self, error: TuioError) {
        self.listeners.dispatch(&[TuioEvent::Error(error)]);
    }
}

/// TUIO receiver: decoded messages in, listener events and snapshots out
pub struct TuioServer {
    config: ServerConfig,
    shared: Arc<Shared>,
    receive_loop: Mutex<Option<ReceiveLoop>>,
}

impl TuioServer {
    /// Create a server driven by the system clock
    pub fn new(config: ServerConfig) -> TuioResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock::new()))
    }

    /// Create a server with an explicit session clock
    pub fn with_clock(config: ServerConfig, clock: Arc<dyn Clock>) -> TuioResult<Self> {
        config.validate()?;

        let shared = Shared {
            cursors: Lane::new(CursorTracker::with_movement_threshold(config.movement_threshold)),
            objects: Lane::new(ObjectTracker::with_config(clock, config.sequence_config())),
            listeners: ListenerRegistry::new(),
        };

        Ok(Self {
            config,
            shared: Arc::new(shared),
            receive_loop: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Process every message of a decoded packet in wire order
    pub fn process_packet(&self, packet: OscPacket) {
        self.shared.process_packet(packet);
    }

    /// Process one message. Unknown and malformed messages are dropped.
    pub fn process_message(&self, msg: &OscMessage) {
        self.shared.process_message(msg);
    }

    /// Relay a failure to every listener
    pub fn report_error(&self, error: TuioError) {
        self.shared.report_error(error);
    }

    /// Bind the UDP receiver and start processing datagrams.
    ///
    /// Returns the bound address. Receive and decode failures are relayed
    /// to listeners as error events.
    pub async fn connect(&self) -> TuioResult<SocketAddr> {
        if self.is_connected() {
            return Err(TuioError::AlreadyConnected);
        }

        let receiver = UdpReceiver::bind(self.config.bind_addr)
            .await?
            .with_buffer_size(self.config.packet_buffer);

        let shared = Arc::clone(&self.shared);
        let handle = spawn_receive_loop(receiver, move |received| match received {
            Ok((packet, _from)) => shared.process_packet(packet),
            Err(e) => shared.report_error(e),
        });
        let local_addr = handle.local_addr();

        let mut slot = self.receive_loop.lock();
        if slot.as_ref().is_some_and(|h| !h.is_finished()) {
            // Lost a race with a concurrent connect; dropping the handle stops the loop
            return Err(TuioError::AlreadyConnected);
        }
        *slot = Some(handle);
        drop(slot);

        tracing::info!(%local_addr, "TUIO server listening");
        Ok(local_addr)
    }

    /// Stop the receive loop. A frame being processed completes first.
    /// Calling this while disconnected does nothing.
    pub async fn disconnect(&self) {
        let handle = self.receive_loop.lock().take();
        if let Some(handle) = handle {
            let local_addr = handle.local_addr();
            handle.stop().await;
            tracing::info!(%local_addr, "TUIO server stopped");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.receive_loop.lock().as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Bound address while connected
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.receive_loop.lock().as_ref().map(ReceiveLoop::local_addr)
    }

    pub fn set_movement_threshold(&self, threshold: f32) -> TuioResult<()> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(TuioError::InvalidConfig(format!(
                "movement threshold must be finite and non-negative, got {}",
                threshold
            )));
        }
        self.shared.cursors.tracker.lock().set_movement_threshold(threshold);
        Ok(())
    }

    pub fn movement_threshold(&self) -> f32 {
        self.shared.cursors.tracker.lock().movement_threshold()
    }

    // Listeners

    pub fn add_listener(&self, listener: Arc<dyn TuioListener>) -> ListenerId {
        self.shared.listeners.register(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.shared.listeners.unregister(id)
    }

    /// Register a channel listener and return its receiving end
    pub fn subscribe(&self) -> (ListenerId, tokio::sync::mpsc::UnboundedReceiver<TuioEvent>) {
        let (listener, rx) = ChannelListener::new();
        (self.add_listener(Arc::new(listener)), rx)
    }

    // Queries

    /// Live objects in ascending session order
    pub fn objects(&self) -> Vec<TuioObject> {
        self.shared.objects.tracker.lock().objects()
    }

    pub fn object(&self, session_id: SessionId) -> Option<TuioObject> {
        self.shared.objects.tracker.lock().object(session_id)
    }

    /// Live cursors in ascending session order
    pub fn cursors(&self) -> Vec<TuioCursor> {
        self.shared.cursors.tracker.lock().cursors()
    }

    pub fn cursor(&self, session_id: SessionId) -> Option<TuioCursor> {
        self.shared.cursors.tracker.lock().cursor(session_id)
    }

    /// True if any live object carries `symbol_id`
    pub fn is_marker_alive(&self, symbol_id: SymbolId) -> bool {
        self.shared.objects.tracker.lock().contains_symbol(symbol_id)
    }

    /// Live object with `symbol_id` and the lowest session id
    pub fn marker(&self, symbol_id: SymbolId) -> Option<TuioObject> {
        self.shared.objects.tracker.lock().first_with_symbol(symbol_id)
    }

    pub fn object_count(&self) -> usize {
        self.shared.objects.tracker.lock().object_count()
    }

    /// Last accepted object frame
    pub fn frame_number(&self) -> i32 {
        self.shared.objects.tracker.lock().current_frame()
    }

    /// Time of the last accepted object frame
    pub fn current_time(&self) -> TuioTime {
        self.shared.objects.tracker.lock().current_time()
    }
}

impl std::fmt::Debug for TuioServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TuioServer")
            .field("config", &self.config)
            .field("connected", &self.is_connected())
            .field("listeners", &self.shared.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tuio_osc::OscBundle;
    use tuio_time::ManualClock;

    fn server() -> (TuioServer, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let config = ServerConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            ..ServerConfig::default()
        };
        (TuioServer::with_clock(config, clock.clone()).unwrap(), clock)
    }

    fn obj_set(sid: i32, sym: i32, x: f32, y: f32) -> OscMessage {
        let mut msg = OscMessage::new("/tuio/2Dobj").arg("set").arg(sid).arg(sym).arg(x).arg(y);
        for _ in 0..6 {
            msg = msg.arg(0.0f32);
        }
        msg
    }

    fn alive(profile: &str, ids: &[i32]) -> OscMessage {
        ids.iter()
            .fold(OscMessage::new(profile).arg("alive"), |msg, &id| msg.arg(id))
    }

    fn fseq(profile: &str, frame: i32) -> OscMessage {
        OscMessage::new(profile).arg("fseq").arg(frame)
    }

    fn drain(rx: &mut UnboundedReceiver<TuioEvent>) -> Vec<TuioEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_object_add_then_remove() {
        let (server, _clock) = server();
        let (_, mut rx) = server.subscribe();

        let burst = OscBundle::new(1)
            .push(obj_set(1, 7, 0.5, 0.5))
            .push(alive("/tuio/2Dobj", &[1]))
            .push(fseq("/tuio/2Dobj", 1));
        server.process_packet(burst.into());

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], TuioEvent::ObjectAdded(o) if o.symbol_id == SymbolId::new(7)));
        assert!(matches!(events[1], TuioEvent::Refresh(_)));
        assert_eq!(server.object_count(), 1);
        assert!(server.is_marker_alive(SymbolId::new(7)));
        assert_eq!(server.marker(SymbolId::new(7)).map(|o| o.session_id), Some(SessionId::new(1)));

        server.process_message(&alive("/tuio/2Dobj", &[]));
        server.process_message(&fseq("/tuio/2Dobj", 2));

        let events = drain(&mut rx);
        assert!(matches!(&events[0], TuioEvent::ObjectRemoved(o) if o.session_id == SessionId::new(1)));
        assert_eq!(server.object_count(), 0);
        assert!(!server.is_marker_alive(SymbolId::new(7)));
        assert_eq!(server.frame_number(), 2);
    }

    #[test]
    fn test_late_object_frame_is_silent() {
        let (server, _clock) = server();
        server.process_message(&obj_set(1, 7, 0.5, 0.5));
        server.process_message(&alive("/tuio/2Dobj", &[1]));
        server.process_message(&fseq("/tuio/2Dobj", 10));

        let (_, mut rx) = server.subscribe();
        server.process_message(&obj_set(1, 7, 0.9, 0.9));
        server.process_message(&alive("/tuio/2Dobj", &[1]));
        server.process_message(&fseq("/tuio/2Dobj", 5));

        assert!(drain(&mut rx).is_empty());
        assert_eq!(server.object(SessionId::new(1)).map(|o| o.x), Some(0.5));
    }

    #[test]
    fn test_cursor_profile_routing() {
        let (server, _clock) = server();
        let (_, mut rx) = server.subscribe();

        server.process_message(&OscMessage::new("/tuio/2Dcur").arg("set").arg(4).arg(0.1f32).arg(0.2f32));
        server.process_message(&alive("/tuio/2Dcur", &[4]));
        server.process_message(&fseq("/tuio/2Dcur", 1));

        assert_eq!(
            drain(&mut rx),
            vec![TuioEvent::CursorAdded(TuioCursor::new(SessionId::new(4), 0.1, 0.2))]
        );
        assert_eq!(server.cursors().len(), 1);
        assert!(server.cursor(SessionId::new(4)).is_some());
        // Cursor commits do not touch the object profile
        assert_eq!(server.object_count(), 0);
    }

    #[test]
    fn test_malformed_and_unknown_messages_dropped() {
        let (server, _clock) = server();
        let (_, mut rx) = server.subscribe();

        server.process_message(&OscMessage::new("/tuio/2Dobj").arg("set").arg(1).arg(7).arg(0.5f32));
        server.process_message(&OscMessage::new("/tuio/2Dobj").arg("source").arg("tracker@host"));
        server.process_message(&OscMessage::new("/tuio/2Dcur").arg("fseq"));

        assert!(drain(&mut rx).is_empty());
        assert_eq!(server.object_count(), 0);
    }

    #[test]
    fn test_report_error_reaches_listeners() {
        let (server, _clock) = server();
        let (_, mut rx) = server.subscribe();

        server.report_error(TuioError::Transport("connection refused".into()));

        assert_eq!(
            drain(&mut rx),
            vec![TuioEvent::Error(TuioError::Transport("connection refused".into()))]
        );
    }

    #[test]
    fn test_movement_threshold() {
        let (server, _clock) = server();
        assert_eq!(server.movement_threshold(), 0.0);

        server.set_movement_threshold(0.05).unwrap();
        assert_eq!(server.movement_threshold(), 0.05);
        assert!(server.set_movement_threshold(-1.0).is_err());
        assert_eq!(server.movement_threshold(), 0.05);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ServerConfig {
            movement_threshold: f32::INFINITY,
            ..ServerConfig::default()
        };
        assert!(TuioServer::new(config).is_err());
    }

    #[test]
    fn test_query_from_callback() {
        struct Counting {
            server: Mutex<Option<Arc<TuioServer>>>,
            seen: Mutex<Vec<usize>>,
        }
        impl TuioListener for Counting {
            fn refresh(&self, _time: TuioTime) {
                if let Some(server) = self.server.lock().as_ref() {
                    self.seen.lock().push(server.object_count());
                }
            }
        }

        let (server, _clock) = server();
        let server = Arc::new(server);
        let listener = Arc::new(Counting {
            server: Mutex::new(Some(server.clone())),
            seen: Mutex::new(Vec::new()),
        });
        server.add_listener(listener.clone());

        server.process_message(&obj_set(1, 7, 0.5, 0.5));
        server.process_message(&alive("/tuio/2Dobj", &[1]));
        server.process_message(&fseq("/tuio/2Dobj", 1));

        assert_eq!(*listener.seen.lock(), vec![1]);
        // Break the reference cycle
        listener.server.lock().take();
    }

    #[tokio::test]
    async fn test_connect_and_disconnect() {
        let (server, _clock) = server();
        let (_, mut rx) = server.subscribe();

        let addr = server.connect().await.unwrap();
        assert!(server.is_connected());
        assert_eq!(server.local_addr(), Some(addr));
        assert!(matches!(server.connect().await, Err(TuioError::AlreadyConnected)));

        let burst = OscPacket::from(
            OscBundle::new(1)
                .push(obj_set(3, 9, 0.25, 0.75))
                .push(alive("/tuio/2Dobj", &[3]))
                .push(fseq("/tuio/2Dobj", 1)),
        );
        let sender = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender.send_to(&burst.encode(), addr).await.unwrap();

        let first = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        assert!(matches!(first, TuioEvent::ObjectAdded(o) if o.symbol_id == SymbolId::new(9)));
        let second = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        assert!(matches!(second, TuioEvent::Refresh(_)));

        server.disconnect().await;
        assert!(!server.is_connected());
        assert_eq!(server.local_addr(), None);
        server.disconnect().await;
    }
}
