//! Error types for playback management

use cadence_core::CadenceError;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// Could not bind to the playback session
    #[error("Connection error: {0}")]
    Connection(String),

    /// The engine reported a playback failure
    #[error("Playback error ({code}): {message}")]
    Engine { code: i32, message: String },

    /// Queue operation given an out-of-range index
    #[error("Invalid index {index} for queue of {len} tracks")]
    InvalidIndex { index: usize, len: usize },

    /// Unplayable input, e.g. a track without a stream URI
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The session task is gone; commands can no longer be delivered
    #[error("Playback session closed")]
    SessionClosed,
}

impl PlaybackError {
    /// Create an engine error
    pub fn engine(code: i32, message: impl Into<String>) -> Self {
        Self::Engine {
            code,
            message: message.into(),
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }
}

impl From<CadenceError> for PlaybackError {
    fn from(err: CadenceError) -> Self {
        match err {
            CadenceError::InvalidIndex { index, len } => Self::InvalidIndex { index, len },
            CadenceError::Configuration(message) => Self::Configuration(message),
            other => Self::Configuration(other.to_string()),
        }
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
