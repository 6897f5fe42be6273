//! Unified error handling with Sentry integration.
//!
//! `AppError` is the single error type handlers return. Client-input
//! problems are rejected at the proxy boundary (400) before the gateway is
//! ever invoked; gateway failures map onto HTTP statuses here and
//! server-side failures are captured to Sentry before responding.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::shopify::ShopifyError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed request at the proxy boundary (missing/empty required
    /// fields). Never reaches the gateway.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Shopify API operation failed.
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error payload, matching the `{ "error": ... }` shape of the cart
/// proxy API.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    /// HTTP status for this error.
    ///
    /// Provider-reported validation errors map to 400: the request reached
    /// the provider and was rejected as invalid input, which is not a
    /// server fault. Transport and configuration failures stay 500.
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Shopify(ShopifyError::UserError(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Shopify(ShopifyError::RateLimited(_)) => StatusCode::TOO_MANY_REQUESTS,
            Self::Shopify(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Best-effort message for the response body.
    fn message(&self) -> String {
        match self {
            Self::BadRequest(msg) | Self::Internal(msg) | Self::NotFound(msg) => msg.clone(),
            // Validation messages come straight from the provider so the
            // shopper sees what was actually wrong ("Variant not found").
            Self::Shopify(ShopifyError::UserError(msg)) => msg.clone(),
            Self::Shopify(err) => err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server-side errors to Sentry; client input and provider
        // validation rejections are expected traffic.
        if matches!(self.status(), StatusCode::INTERNAL_SERVER_ERROR) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ErrorBody {
            error: self.message(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
