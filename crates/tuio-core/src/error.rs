//! Error types for TUIO

use thiserror::Error;

use crate::Profile;

/// Core TUIO errors
///
/// Errors are `Clone` so the server can relay one failure to every
/// subscriber of its error-reporting channel.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TuioError {
    // Wire errors
    #[error("Invalid OSC packet: {0}")]
    InvalidPacket(String),

    #[error("Buffer too short: expected {expected}, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    #[error("Unsupported OSC type tag: {0:?}")]
    UnsupportedTypeTag(char),

    // Message errors
    #[error("Malformed {profile} message: {reason}")]
    MalformedMessage { profile: Profile, reason: String },

    // Subscriber errors
    #[error("Listener {id} panicked: {message}")]
    Listener { id: u64, message: String },

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Server already connected")]
    AlreadyConnected,
}

/// Result type for TUIO operations
pub type TuioResult<T> = Result<T, TuioError>;
