//! Error types for kafkamock
//!
//! Provides a unified error type hierarchy for the entire workspace.

use thiserror::Error;

/// Result type alias using kafkamock's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for kafkamock
#[derive(Error, Debug)]
pub enum Error {
    // Protocol Errors
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    // Network Errors
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    // IO Errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Internal Errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Protocol-related errors
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid request header")]
    InvalidHeader,

    #[error("Malformed {0} request")]
    MalformedRequest(&'static str),

    #[error("{0} bytes left unconsumed after {1} request")]
    TrailingBytes(usize, &'static str),

    #[error("Unsupported API {api_key} v{api_version}")]
    UnsupportedApi { api_key: i16, api_version: i16 },

    #[error("Handler rejected request: {0}")]
    HandlerRejected(String),
}

/// Network-related errors
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Server already started")]
    AlreadyStarted,

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Bind failed: {0}")]
    BindFailed(String),
}
