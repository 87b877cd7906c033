//! TUIO Transport Layer - UDP reception
//!
//! This crate provides:
//! - A UDP receiver that decodes each datagram into an OSC packet
//! - A background receive loop with cooperative shutdown

pub mod udp;

pub use udp::*;

/// Default TUIO port
pub const DEFAULT_PORT: u16 = 3333;
