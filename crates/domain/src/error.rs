//! Domain error types.

use kv_store::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Broad classification of a failure, independent of any transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or malformed input; nothing was changed.
    Validation,
    /// The request was well-formed but the current state forbids it.
    Business,
    /// A store or event bus call failed.
    Dependency,
}

impl ErrorKind {
    /// Returns the kind name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Business => "business",
            ErrorKind::Dependency => "dependency",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Input rejected before reaching the store.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An error occurred in the key-value store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A stored record could not be converted.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation(_) => ErrorKind::Validation,
            DomainError::Store(err) if err.is_request_error() => ErrorKind::Validation,
            DomainError::Store(_) | DomainError::Serialization(_) => ErrorKind::Dependency,
        }
    }
}

/// Result type for domain operations.
pub type Result<T> = std::result::Result<T, DomainError>;
