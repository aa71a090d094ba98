//! Error types for the store module.

use nomochain_core::CoreError;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record encoding or decoding failed.
    #[error("codec error: {0}")]
    Codec(#[from] CoreError),

    /// The bytes handed to the store do not describe the state they came with.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
