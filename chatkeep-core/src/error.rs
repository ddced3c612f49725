//! Error types for chatkeep

use thiserror::Error;

/// The main error type for chatkeep operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Stored session data is not a valid, non-empty message sequence
    #[error("Decode error: {0}")]
    Decode(String),

    /// Reading the storage slot failed
    #[error("Storage read error: {0}")]
    StorageRead(String),

    /// Writing or removing the storage slot failed
    #[error("Storage write error: {0}")]
    StorageWrite(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),
}

/// A specialized Result type for chatkeep operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
