//! TUIO Test Harness - Scenario building and end-to-end validation
//!
//! This crate provides:
//! - A burst builder producing the OSC bundles a tracker would send
//! - A recording listener
//! - A harness wiring a server to a manual clock
//! - End-to-end scenario tests, in process and over UDP loopback

pub mod burst;
pub mod recorder;
pub mod scenario;

pub use burst::*;
pub use recorder::*;
pub use scenario::*;
