//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;
use domain::DomainError;
use gateway::GatewayError;
use store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed caller identity.
    Unauthorized(String),
    /// Caller identity lacks the required role.
    Forbidden(String),
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Cart or checkout operation failed.
    Checkout(CheckoutError),
    /// Store operation failed outside a checkout flow.
    Store(StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Store(err) => store_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, String) {
    match &err {
        CheckoutError::Domain(_)
        | CheckoutError::OutOfStock { .. }
        | CheckoutError::InsufficientStock { .. }
        | CheckoutError::EmptyCart
        | CheckoutError::BelowMinimum { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        CheckoutError::ProductNotFound(_)
        | CheckoutError::CartNotFound
        | CheckoutError::SessionCartGone
        | CheckoutError::LineNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        CheckoutError::Gateway(GatewayError::SessionNotFound(_)) => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        CheckoutError::Gateway(GatewayError::Provider(_)) => {
            tracing::error!(error = %err, "payment gateway failure");
            (StatusCode::BAD_GATEWAY, err.to_string())
        }
        CheckoutError::Store(_) => {
            tracing::error!(error = %err, "store failure during checkout");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            )
        }
    }
}

fn store_error_to_response(err: StoreError) -> (StatusCode, String) {
    match &err {
        StoreError::ProductNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        _ => {
            tracing::error!(error = %err, "store failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            )
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}
