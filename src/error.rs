//! Error types for conftree
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

use crate::protocol::ValueType;

/// Result type alias using ConfTreeError
pub type Result<T> = std::result::Result<T, ConfTreeError>;

/// Unified error type for conftree operations
#[derive(Debug, Error)]
pub enum ConfTreeError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Connection closed by peer")]
    ConnectionClosed,

    #[error("Operation timed out")]
    Timeout,

    #[error("Not connected")]
    NotConnected,

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Unknown action code: 0x{0:02x}")]
    UnknownAction(u8),

    #[error("Unknown value type code: 0x{0:02x}")]
    UnknownType(u8),

    // -------------------------------------------------------------------------
    // Value Errors
    // -------------------------------------------------------------------------
    #[error("Cannot convert '{value}' to type {value_type}")]
    ValueFormat { value_type: ValueType, value: String },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ConfTreeError {
    /// True for failures that leave the connection unusable
    /// (refused, reset, closed mid-frame, timed out).
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            ConfTreeError::Io(_)
                | ConfTreeError::Connection(_)
                | ConfTreeError::ConnectionClosed
                | ConfTreeError::Timeout
                | ConfTreeError::NotConnected
        )
    }
}
