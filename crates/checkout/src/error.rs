//! Checkout error types.

use domain::{DomainError, ErrorKind};
use event_bus::EventBusError;
use thiserror::Error;

/// Errors that can stop a checkout. None of them leave side effects behind.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The request is missing required data.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The user has no basket.
    #[error("Basket not found for user: {0}")]
    BasketNotFound(String),

    /// The user's basket has no items.
    #[error("Basket is empty for user: {0}")]
    EmptyBasket(String),

    /// Reading the basket failed.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// The bus rejected the checkout event.
    #[error("Publish failed: {0}")]
    Publish(#[from] EventBusError),

    /// The checkout event could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CheckoutError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CheckoutError::Validation(_) => ErrorKind::Validation,
            CheckoutError::BasketNotFound(_) | CheckoutError::EmptyBasket(_) => {
                ErrorKind::Business
            }
            CheckoutError::Domain(err) => err.kind(),
            CheckoutError::Publish(_) | CheckoutError::Serialization(_) => ErrorKind::Dependency,
        }
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basket_problems_are_business_errors() {
        assert_eq!(
            CheckoutError::BasketNotFound("alice".into()).kind(),
            ErrorKind::Business
        );
        assert_eq!(
            CheckoutError::EmptyBasket("alice".into()).kind(),
            ErrorKind::Business
        );
        assert_eq!(
            CheckoutError::Publish(EventBusError::PublishFailed("down".into())).kind(),
            ErrorKind::Dependency
        );
    }
}
