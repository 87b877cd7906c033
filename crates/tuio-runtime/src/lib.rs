//! TUIO Runtime - Server, listener dispatch and message routing
//!
//! The server routes decoded OSC messages to the per-profile trackers,
//! delivers the events of every committed frame to registered listeners
//! and exposes read-only snapshots of the live sessions.

pub mod command;
pub mod config;
pub mod listener;
pub mod server;

pub use command::*;
pub use config::*;
pub use listener::*;
pub use server::*;
