use thiserror::Error;

/// Errors that can occur when interacting with the key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The table has not been registered with the store.
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// A key or item did not match the table's key schema.
    #[error("Invalid key for table {table}: {reason}")]
    InvalidKey { table: String, reason: String },

    /// A partial update tried to change one of the key attributes.
    #[error("Cannot update key attribute '{attribute}' of table {table}")]
    KeyAttributeUpdate { table: String, attribute: String },

    /// A partial update carried no attributes.
    #[error("Update for table {table} contains no attributes")]
    EmptyUpdate { table: String },

    /// A conditional write found an existing item under the same key.
    #[error("Conditional check failed: an item with this key already exists in table {table}")]
    ConditionalCheckFailed { table: String },

    /// The backing service could not serve the request.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns true if the error was caused by the request rather than by the
    /// backing service.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidKey { .. }
                | StoreError::KeyAttributeUpdate { .. }
                | StoreError::EmptyUpdate { .. }
                | StoreError::ConditionalCheckFailed { .. }
        )
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
