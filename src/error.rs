//! Error types for the course ledger service
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific ledger scenarios
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Storage unavailable: {message}")]
    StorageUnavailable { message: String },

    #[error("Invalid call: {reason}")]
    InvalidCall { reason: String },

    #[error("Unknown method: {method}")]
    UnknownMethod { method: String },

    #[error("Call carries no sender principal")]
    MissingSender,

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}
