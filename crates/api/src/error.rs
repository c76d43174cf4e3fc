//! API error types with HTTP response mapping.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;
use domain::{DomainError, ErrorKind};
use ordering::OrderingError;

/// API-level error type that maps to HTTP responses.
///
/// Response bodies are `{"error": <kind>, "message": <text>}`.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Catalog or basket error.
    Domain(DomainError),
    /// Checkout error.
    Checkout(CheckoutError),
    /// Order ingestion or query error.
    Ordering(OrderingError),
}

impl ApiError {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        let kind = match self {
            ApiError::NotFound(_) => return (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => ErrorKind::Validation,
            ApiError::Domain(err) => err.kind(),
            ApiError::Checkout(err) => err.kind(),
            ApiError::Ordering(err) => err.kind(),
        };
        let status = match kind {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Business => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Dependency => StatusCode::BAD_GATEWAY,
        };
        (status, kind.as_str())
    }

    fn message(&self) -> String {
        match self {
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Domain(err) => err.to_string(),
            ApiError::Checkout(err) => err.to_string(),
            ApiError::Ordering(err) => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();
        let message = self.message();
        if status.is_server_error() {
            tracing::error!(error = %message, kind, "dependency failure");
        }

        let body = serde_json::json!({ "error": kind, "message": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<OrderingError> for ApiError {
    fn from(err: OrderingError) -> Self {
        ApiError::Ordering(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use event_bus::EventBusError;
    use kv_store::StoreError;

    use super::*;

    #[test]
    fn kinds_map_to_status_codes() {
        let cases = [
            (
                ApiError::BadRequest("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::NotFound("gone".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::Checkout(CheckoutError::EmptyBasket("alice".into())),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ApiError::Checkout(CheckoutError::Publish(EventBusError::PublishFailed(
                    "down".into(),
                ))),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::Domain(DomainError::Store(StoreError::Unavailable("down".into()))),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::Ordering(OrderingError::UnrecognizedInbound),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
