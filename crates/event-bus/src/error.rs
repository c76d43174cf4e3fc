use thiserror::Error;

/// Errors that can occur when publishing events.
#[derive(Debug, Error)]
pub enum EventBusError {
    /// No bus exists with the requested name.
    #[error("Event bus not found: {0}")]
    BusNotFound(String),

    /// The bus rejected or could not accept the event.
    #[error("Publish failed: {0}")]
    PublishFailed(String),

    /// The event could not be serialized for delivery.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for event bus operations.
pub type Result<T> = std::result::Result<T, EventBusError>;
