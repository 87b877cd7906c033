//! TUIO OSC - Open Sound Control packet format
//!
//! TUIO messages travel as OSC 1.0 packets:
//! - Messages: padded address, `,`-prefixed type tags, big-endian arguments
//! - Bundles: `#bundle`, 64-bit time tag, size-prefixed elements
//!
//! Only decoding is needed to receive TUIO; encoding is provided for
//! senders and test harnesses.

pub mod arg;
pub mod packet;

pub use arg::*;
pub use packet::*;

/// Largest datagram accepted by the receiver
pub const MAX_PACKET_SIZE: usize = 65_507;
