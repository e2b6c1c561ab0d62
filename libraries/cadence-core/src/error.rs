/// Core error types for Cadence
use thiserror::Error;

/// Result type alias using `CadenceError`
pub type Result<T> = std::result::Result<T, CadenceError>;

/// Core error type for Cadence
#[derive(Error, Debug)]
pub enum CadenceError {
    /// A track or queue was described with unusable data (e.g. empty stream URI)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Index outside the bounds of a track list
    #[error("Invalid index {index} for {len} tracks")]
    InvalidIndex { index: usize, len: usize },

    /// Song list provider failed
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CadenceError {
    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a catalog error
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }

    /// Whether the caller may retry the operation that produced this error
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Catalog(_) | Self::Io(_))
    }
}
