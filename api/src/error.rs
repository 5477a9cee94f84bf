use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use overload_core::error::{self, ApiError};
use overload_core::history::HistoryError;

/// Internal error type that converts to structured API responses
#[derive(Debug)]
pub enum AppError {
    /// Validation error (400)
    Validation {
        message: String,
        field: Option<String>,
        received: Option<serde_json::Value>,
        docs_hint: Option<String>,
    },
    /// Referenced resource does not exist (404)
    NotFound { resource: String },
    /// Database error (500)
    Database(sqlx::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = uuid::Uuid::now_v7().to_string();
        let status = self.status();

        let api_error = match self {
            AppError::Validation {
                message,
                field,
                received,
                docs_hint,
            } => ApiError {
                error: error::codes::VALIDATION_FAILED.to_string(),
                message,
                field,
                received,
                request_id,
                docs_hint,
            },
            AppError::NotFound { resource } => ApiError {
                error: error::codes::NOT_FOUND.to_string(),
                message: format!("{resource} not found"),
                field: None,
                received: None,
                request_id,
                docs_hint: None,
            },
            AppError::Database(err) => {
                tracing::error!(request_id = %request_id, "Database error: {:?}", err);
                ApiError {
                    error: error::codes::INTERNAL_ERROR.to_string(),
                    message: "An internal error occurred".to_string(),
                    field: None,
                    received: None,
                    request_id,
                    docs_hint: None,
                }
            }
        };

        (status, Json(api_error)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err)
    }
}

impl From<HistoryError<sqlx::Error>> for AppError {
    fn from(err: HistoryError<sqlx::Error>) -> Self {
        match err {
            HistoryError::ExerciseNotFound(id) => AppError::NotFound {
                resource: format!("Exercise with id {id}"),
            },
            HistoryError::Source(db) => AppError::Database(db),
        }
    }
}
