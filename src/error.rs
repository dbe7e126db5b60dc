//! Error types for pfmap
//!
//! Provides a unified error type for all operations, plus the two
//! protocol-level error families that decide whether a connection survives.

use thiserror::Error;

/// Result type alias using MapError
pub type Result<T> = std::result::Result<T, MapError>;

/// Unified error type for pfmap operations
#[derive(Debug, Error)]
pub enum MapError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Cannot listen on {endpoint}: {source}")]
    Bind {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    // -------------------------------------------------------------------------
    // Lookup Table Errors
    // -------------------------------------------------------------------------
    #[error("Table error: {0}")]
    Table(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Client Errors
    // -------------------------------------------------------------------------
    #[error("Unexpected reply from server: {0}")]
    Client(String),
}

/// Malformed framing on the wire
///
/// Fatal for a socketmap connection, answered with `500` on tcp_table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("invalid netstring length prefix")]
    InvalidLength,

    #[error("netstring length prefix exceeds {max_digits} digits")]
    LengthTooLong { max_digits: usize },

    #[error("netstring length {declared} exceeds limit {limit}")]
    TooLarge { declared: usize, limit: usize },

    #[error("netstring payload not terminated by ','")]
    MissingComma,

    #[error("request line exceeds {limit} bytes")]
    LineTooLong { limit: usize },
}

/// A well-framed request the server cannot act on
///
/// Always answered with a client error; the connection stays open.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("empty request")]
    EmptyRequest,

    #[error("missing key in '{verb}' request")]
    MissingKey { verb: String },

    #[error("unsupported command '{verb}'")]
    UnknownCommand { verb: String },
}
