//! Error types for tdwire
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using TdError
pub type Result<T> = std::result::Result<T, TdError>;

/// Unified error type for tdwire operations
#[derive(Debug, Error)]
pub enum TdError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection to {addr} refused: {source}")]
    ConnectionRefused {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Timed out during {operation}")]
    Timeout { operation: &'static str },

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Truncated input: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Session Errors
    // -------------------------------------------------------------------------
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Connection is not authenticated")]
    NotAuthenticated,

    #[error("Server error {code}: {message}")]
    Server { code: u16, message: String },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TdError {
    /// Map an I/O error raised on an open socket, turning read/write
    /// timeouts into `Timeout`.
    pub(crate) fn from_io(operation: &'static str, err: std::io::Error) -> Self {
        match err.kind() {
            // Unix reports an expired SO_RCVTIMEO as WouldBlock, Windows as TimedOut
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => {
                TdError::Timeout { operation }
            }
            _ => TdError::Io(err),
        }
    }
}
