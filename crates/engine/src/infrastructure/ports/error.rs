//! Error types for port operations.

use std::time::Duration;

/// Persistence errors with context for debugging.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PersistenceError {
    /// Storage I/O failed - includes operation name for tracing.
    #[error("Storage error in {operation}: {message}")]
    Io {
        operation: &'static str,
        message: String,
    },

    /// Serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A stored record exists but cannot be read back.
    #[error("Corrupt record for user {user}: {message}")]
    Corrupt { user: String, message: String },
}

impl PersistenceError {
    /// Create an Io error with operation context.
    pub fn io(operation: &'static str, message: impl ToString) -> Self {
        Self::Io {
            operation,
            message: message.to_string(),
        }
    }

    pub fn serialization(message: impl ToString) -> Self {
        Self::Serialization(message.to_string())
    }

    pub fn corrupt(user: impl ToString, message: impl ToString) -> Self {
        Self::Corrupt {
            user: user.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("LLM request timed out after {0:?}")]
    Timeout(Duration),
    #[error("LLM service unavailable")]
    Unavailable,
}
