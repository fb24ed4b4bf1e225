//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`.
//! Clients always receive `{ "error": "<message>" }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::backend::BackendError;
use crate::checkout::CheckoutError;
use crate::membership::MembershipError;

/// Application-level error type for the storefront gateway.
#[derive(Debug, Error)]
pub enum AppError {
    /// A marketplace backend call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// The checkout flow refused or failed an event.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// A wishlist/cart membership change failed.
    #[error("Membership error: {0}")]
    Membership(#[from] MembershipError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or malformed credential.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Status for a backend failure.
fn backend_status(err: &BackendError) -> StatusCode {
    match err {
        BackendError::Status { status, .. } => match *status {
            401 => StatusCode::UNAUTHORIZED,
            403 => StatusCode::FORBIDDEN,
            404 => StatusCode::NOT_FOUND,
            400..=499 => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::BAD_GATEWAY,
        },
        BackendError::NotFound(_) => StatusCode::NOT_FOUND,
        BackendError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
        BackendError::Http(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
        BackendError::Http(_) | BackendError::Parse(_) | BackendError::UnexpectedShape(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Backend(e)
            | Self::Checkout(CheckoutError::Backend(e))
            | Self::Membership(MembershipError::Backend(e)) => backend_status(e),
            Self::Checkout(CheckoutError::EmptyCart | CheckoutError::AmountOutOfRange)
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Checkout(CheckoutError::InvalidTransition { .. })
            | Self::Membership(MembershipError::Pending(_)) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend(e) => e.user_message(),
            Self::Checkout(e) => e.user_message(),
            Self::Membership(e) => e.user_message(),
            // Don't expose internal error details to clients
            Self::Internal(_) => "Internal server error".to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Unauthorized(message) | Self::BadRequest(message) => message.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server-side failures to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        (status, Json(json!({ "error": self.user_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: &[(&str, &str)]) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}
