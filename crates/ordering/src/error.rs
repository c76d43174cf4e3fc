//! Ordering error types.

use domain::ErrorKind;
use kv_store::StoreError;
use thiserror::Error;

/// Errors that can occur while ingesting or querying orders.
#[derive(Debug, Error)]
pub enum OrderingError {
    /// A checkout event is missing required data.
    #[error("Invalid checkout event: {0}")]
    InvalidEvent(String),

    /// An inbound payload matches none of the known shapes.
    #[error("Unrecognized inbound payload")]
    UnrecognizedInbound,

    /// An HTTP request used a method the ordering service does not serve.
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    /// An error occurred in the key-value store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// An inbound payload or checkout event could not be parsed.
    #[error("Malformed payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// An order could not be converted to or from its stored form.
    #[error("Corrupt order record: {0}")]
    CorruptRecord(serde_json::Error),
}

impl OrderingError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderingError::InvalidEvent(_)
            | OrderingError::UnrecognizedInbound
            | OrderingError::UnsupportedMethod(_)
            | OrderingError::MalformedPayload(_) => ErrorKind::Validation,
            OrderingError::Store(_) | OrderingError::CorruptRecord(_) => ErrorKind::Dependency,
        }
    }
}

/// Result type for ordering operations.
pub type Result<T> = std::result::Result<T, OrderingError>;
