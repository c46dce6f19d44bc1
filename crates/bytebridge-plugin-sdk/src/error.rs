//! Error types for the bytebridge plugin SDK

use thiserror::Error;

/// Result type for processor operations
pub type Result<T> = std::result::Result<T, ProcessorError>;

/// Errors a processor can surface from `execute`
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// Request bytes could not be decoded by the processor's wire codec
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// Business-logic handler failed
    #[error("handler error: {0}")]
    Handler(String),

    /// JSON decoding/encoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProcessorError {
    /// Create a new malformed-request error
    pub fn malformed(msg: impl Into<String>) -> Self {
        ProcessorError::MalformedRequest(msg.into())
    }

    /// Create a new handler error
    pub fn handler(msg: impl Into<String>) -> Self {
        ProcessorError::Handler(msg.into())
    }
}

/// Errors raised while registering a processor with the host
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Service names cross the ABI as C strings and cannot contain NUL
    #[error("service name contains an interior NUL byte: {0:?}")]
    InvalidServiceName(String),
}
