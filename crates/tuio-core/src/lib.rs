//! TUIO Core - Fundamental types and primitives
//!
//! This crate defines the core types shared by every TUIO crate:
//! - Identifiers (SessionId, SymbolId)
//! - Time snapshots (TuioTime)
//! - Tracked entities (TuioCursor, TuioObject) and their lifecycle state
//! - Events delivered to subscribers
//! - Errors

pub mod id;
pub mod time;
pub mod entity;
pub mod event;
pub mod error;

pub use id::*;
pub use time::*;
pub use entity::*;
pub use event::*;
pub use error::*;
