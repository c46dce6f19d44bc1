//! Error types for the bytebridge host

use thiserror::Error;

/// Result type for host operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors that can occur in host operations
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A shared module failed to open
    #[error("failed to load plugin module: {0}")]
    PluginLoad(String),

    /// The registration entrypoint symbol was not found in a module
    #[error("plugin entrypoint missing: {0}")]
    EntrypointMissing(String),

    /// No processor is registered under the requested service name
    #[error("service not found: {0}")]
    ServiceNotFound(String),

    /// Dispatch was attempted before the load phase completed, or after shutdown
    #[error("bridge is not initialized")]
    NotInitialized,

    /// The processor failed (or panicked) while executing the request
    #[error("processing failed: {0}")]
    ProcessingFailed(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
