//! Application error types.
//!
//! These are infrastructure errors: things that go wrong inside the gateway
//! or on its way to a collaborator. Tool-level outcomes (a 404 from the
//! calendar API, a pending authorization) are values of
//! [`ToolResult`](crate::dispatch::ToolResult), not errors.

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the gateway.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input (maps to IPC INVALID_ARGUMENT).
    #[error("validation error: {0}")]
    Validation(String),

    /// Unknown tool, service or method (maps to IPC NOT_FOUND).
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid or incomplete configuration (maps to IPC FAILED_PRECONDITION).
    #[error("configuration error: {0}")]
    Config(String),

    /// Credential broker unreachable or failing. Retryable, and never a
    /// signal that the user has to authorize again.
    #[error("credential broker unavailable: {0}")]
    BrokerUnavailable(String),

    /// Calendar API unreachable at the transport level.
    #[error("upstream unavailable: {0}")]
    Upstream(String),

    /// Outbound call exceeded its deadline.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Internal errors (maps to IPC INTERNAL).
    #[error("internal error: {0}")]
    Internal(String),

    /// Cancellation requested by the caller.
    #[error("operation cancelled: {0}")]
    Cancelled(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Error code carried in IPC error frames.
    pub fn to_ipc_error_code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "INVALID_ARGUMENT",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Config(_) => "FAILED_PRECONDITION",
            Error::BrokerUnavailable(_) | Error::Upstream(_) => "UNAVAILABLE",
            Error::Timeout(_) => "DEADLINE_EXCEEDED",
            Error::Cancelled(_) => "CANCELLED",
            Error::Internal(_) | Error::Serialization(_) | Error::Io(_) => "INTERNAL",
        }
    }

    /// Whether a caller may reasonably retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::BrokerUnavailable(_) | Error::Upstream(_) | Error::Timeout(_)
        )
    }
}

// Convenience constructors
impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn broker_unavailable(msg: impl Into<String>) -> Self {
        Self::BrokerUnavailable(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }
}
