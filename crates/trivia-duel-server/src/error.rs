//! Trivia Duel: server error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use trivia_duel_core::error::DomainError;

/// Startup errors for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            DomainError::DuelNotFound(_) => (StatusCode::NOT_FOUND, "duel_not_found"),
            DomainError::PlayerNotFound(_) => (StatusCode::NOT_FOUND, "player_not_found"),
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            DomainError::Rejected(_) => (StatusCode::CONFLICT, "rejected"),
            DomainError::ContentUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "content_unavailable")
            }
            DomainError::DeliveryFailed(_) => (StatusCode::SERVICE_UNAVAILABLE, "delivery_failed"),
            DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        };

        // Players see the rejection text itself, without the error prefix.
        let message = match &self.0 {
            DomainError::Rejected(rejection) => rejection.to_string(),
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: error_code,
            message,
        };

        (status, Json(body)).into_response()
    }
}
