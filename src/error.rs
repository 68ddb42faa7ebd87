use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, warn};

/// Every failure a handler can surface, rendered as `{"message": ...}` JSON
/// at the request boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid input!")]
    InvalidInput,
    #[error("Invalid credentials!")]
    InvalidCredentials,
    #[error("Token is missing!")]
    TokenMissing,
    #[error("Token has expired!")]
    TokenExpired,
    #[error("Invalid token!")]
    TokenInvalid,
    #[error("Payment not found!")]
    PaymentNotFound,
    #[error("User already exists or other error occurred!")]
    Store(#[from] sqlx::Error),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput | Self::Store(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials
            | Self::TokenMissing
            | Self::TokenExpired
            | Self::TokenInvalid => StatusCode::UNAUTHORIZED,
            Self::PaymentNotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            // Store failures carry the underlying detail alongside the message
            Self::Store(e) => json!({ "message": self.to_string(), "error": e.to_string() }),
            _ => json!({ "message": self.to_string() }),
        };

        if status.is_server_error() {
            error!(%status, error = %self, "request failed");
        } else {
            warn!(%status, error = %self, "request rejected");
        }

        (status, Json(body)).into_response()
    }
}
