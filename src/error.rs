//! Error types for ctstore
//!
//! Provides a unified error type for all recoverable outcomes.
//!
//! Filesystem failures inside the storage engine are deliberately absent
//! here: the operation layer aborts the process instead of returning them
//! (see [`crate::fsop`]).

use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for ctstore operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // Storage Outcomes
    // -------------------------------------------------------------------------
    #[error("Entry not found")]
    NotFound,

    #[error("Entry already exists")]
    EntryAlreadyExists,

    // -------------------------------------------------------------------------
    // I/O Errors (network and CLI side only)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Unsupported protocol version: {0}")]
    UnsupportedVersion(u8),

    #[error("Unknown command type: 0x{0:02x}")]
    UnknownCommand(u8),

    #[error("Payload too large: {0} bytes")]
    PayloadTooLarge(usize),

    /// The server answered with an ERROR reply
    #[error("Server error ({code:?}): {message}")]
    Server {
        code: crate::protocol::ErrorCode,
        message: String,
    },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
