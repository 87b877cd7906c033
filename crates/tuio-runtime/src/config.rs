//! Server configuration

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use tuio_core::{TuioError, TuioResult};
use tuio_osc::MAX_PACKET_SIZE;
use tuio_state::{SequenceConfig, LATE_FRAME_WINDOW, TIME_REFRESH_INTERVAL};
use tuio_transport::{DEFAULT_BUFFER_SIZE, DEFAULT_PORT};

/// TUIO server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Local address the UDP receiver binds to
    pub bind_addr: SocketAddr,
    /// Minimum cursor displacement reported as movement
    pub movement_threshold: f32,
    /// Frame regression beyond which an `fseq` counts as a sender reset
    pub late_frame_window: i32,
    /// How long an unsequenced frame may reuse the committed time
    pub time_refresh_interval: Duration,
    /// Datagram receive buffer size
    pub packet_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            movement_threshold: 0.0,
            late_frame_window: LATE_FRAME_WINDOW,
            time_refresh_interval: TIME_REFRESH_INTERVAL,
            packet_buffer: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl ServerConfig {
    /// Default configuration on a different port
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> TuioResult<()> {
        if !self.movement_threshold.is_finite() || self.movement_threshold < 0.0 {
            return Err(TuioError::InvalidConfig(format!(
                "movement threshold must be finite and non-negative, got {}",
                self.movement_threshold
            )));
        }
        if self.late_frame_window < 0 {
            return Err(TuioError::InvalidConfig(format!(
                "late frame window must be non-negative, got {}",
                self.late_frame_window
            )));
        }
        if self.packet_buffer < 16 || self.packet_buffer > MAX_PACKET_SIZE {
            return Err(TuioError::InvalidConfig(format!(
                "packet buffer must be within 16..={}, got {}",
                MAX_PACKET_SIZE, self.packet_buffer
            )));
        }
        Ok(())
    }

    pub fn sequence_config(&self) -> SequenceConfig {
        SequenceConfig {
            late_frame_window: self.late_frame_window,
            time_refresh_interval: self.time_refresh_interval,
        }
    }
}
