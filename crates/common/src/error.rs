use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::types::SeriesError;

/// Common error types used across the application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid price series: {0}")]
    Series(#[from] SeriesError),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No usable data: {0}")]
    NoUsableData(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Io(_) | AppError::Csv(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Series(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NoUsableData(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::NoUsableData(msg)
            | AppError::Upstream(msg) => msg.clone(),
            _ => self.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = json!({ "error": message });
        (status, Json(body)).into_response()
    }
}
