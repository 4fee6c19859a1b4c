//! Error types for the domain layer
//!
//! `DomainError` covers value validation. Story loading and traversal have
//! their own enums because callers react to them differently: a load error is
//! fatal at startup, a choice error is a re-prompt or a self-healing restart.

use thiserror::Error;

use crate::ids::NodeKey;

/// Unified error type for domain value validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., empty key)
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl DomainError {
    /// Creates a validation error for values that violate an invariant.
    ///
    /// # Example
    /// ```ignore
    /// if key.is_empty() {
    ///     return Err(DomainError::validation("Node key cannot be empty"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Errors from building a story graph out of its source definition.
#[derive(Debug, Error)]
pub enum StoryLoadError {
    #[error("Failed to read story source: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed story source: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid story: {0}")]
    Invalid(String),
}

impl StoryLoadError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

impl From<DomainError> for StoryLoadError {
    fn from(err: DomainError) -> Self {
        Self::Invalid(err.to_string())
    }
}

/// Errors from applying a choice to a session.
///
/// Both variants leave the session untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChoiceError {
    /// The text matches none of the current node's choices.
    #[error("'{selected}' is not a choice at node '{node}'")]
    InvalidChoice { node: NodeKey, selected: String },

    /// The matched choice points at a node the graph does not contain.
    #[error("Choice at node '{from}' leads to missing node '{target}'")]
    DanglingTarget { from: NodeKey, target: NodeKey },
}
