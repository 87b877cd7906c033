//! End-to-end scenarios
//!
//! `Harness` wires a server to a manual clock and a recording listener so
//! a test can feed bursts and inspect exactly what listeners saw.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tuio_core::{TuioResult, TuioTime};
use tuio_osc::OscPacket;
use tuio_runtime::{ServerConfig, TuioServer};
use tuio_time::ManualClock;

use crate::RecordingListener;

/// Server, clock and recorder for one scenario
pub struct Harness {
    pub server: Arc<TuioServer>,
    pub clock: Arc<ManualClock>,
    pub recorder: Arc<RecordingListener>,
}

impl Harness {
    /// Default configuration bound to an ephemeral loopback port
    pub fn new() -> TuioResult<Self> {
        Self::with_config(ServerConfig {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 0)),
            ..ServerConfig::default()
        })
    }

    pub fn with_config(config: ServerConfig) -> TuioResult<Self> {
        let clock = Arc::new(ManualClock::new());
        let server = Arc::new(TuioServer::with_clock(config, clock.clone())?);
        let recorder = Arc::new(RecordingListener::new());
        server.add_listener(recorder.clone());

        Ok(Self {
            server,
            clock,
            recorder,
        })
    }

    pub fn send(&self, packet: OscPacket) {
        self.server.process_packet(packet);
    }

    pub fn advance(&self, millis: u64) -> TuioTime {
        self.clock.advance(Duration::from_millis(millis))
    }
}
