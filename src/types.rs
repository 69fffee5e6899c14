//! Shared error and result types

use thiserror::Error;

/// Top-level error type for parchment
#[derive(Debug, Error)]
pub enum ParchmentError {
    /// MongoDB connectivity or query failure
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration problem detected at startup
    #[error("Configuration error: {0}")]
    Config(String),

    /// Socket / listener failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, ParchmentError>;
