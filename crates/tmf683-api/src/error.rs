//! Server failures and the JSON error responses of the Party Interaction API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tmf683_core::error::DomainError;

/// Anything that stops the server from starting or keeps it from serving.
#[derive(Debug, Error)]
pub enum AppError {
    /// A configuration variable could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// The PostgreSQL pool could not connect.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The `party_interactions` / `event_logs` migrations did not apply.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The subscriber or the OTLP exporter could not be installed.
    #[error("telemetry error: {0}")]
    Telemetry(String),

    /// Binding the listener or serving connections failed.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Body of every non-2xx response, e.g.
/// `{"error": "aggregate_not_found", "message": "aggregate not found: pi-1"}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable snake_case code clients can match on.
    pub error: &'static str,
    /// The domain error's display text.
    pub message: String,
}

/// A handler failure on its way to the client.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            DomainError::AggregateNotFound(_) => (StatusCode::NOT_FOUND, "aggregate_not_found"),
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            DomainError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "infrastructure_error")
            }
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        let body = ErrorBody {
            error,
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
