//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
///
/// Every failure is scoped to a single operation; nothing here is fatal to
/// the process. Validation failures carry the full list of messages so the
/// transport layer can report them all at once.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bad credentials. The message is identical for an unknown email and a
    /// wrong password so callers cannot enumerate registered accounts.
    #[error("Invalid email or password")]
    Auth,

    #[error("Missing or invalid session token")]
    Unauthenticated,

    #[error("Session expired")]
    Expired,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Create a validation error from a single message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(vec![msg.into()])
    }

    /// Message safe to show to untrusted callers.
    ///
    /// Storage errors keep the underlying database text in `Display` for
    /// logs, but that text never crosses the trust boundary.
    pub fn public_message(&self) -> String {
        match self {
            Self::Storage(_) => "Storage error".to_string(),
            other => other.to_string(),
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
