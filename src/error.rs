use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            Self::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Invalid language parameter",
                msg.clone(),
            ),
            Self::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch weather data",
                    msg.clone(),
                )
            }
            Self::Cache(msg) => {
                tracing::error!("Cache error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Cache error", msg.clone())
            }
            Self::DataIntegrity(msg) => {
                tracing::error!("Data integrity error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Inconsistent upstream data",
                    msg.clone(),
                )
            }
            Self::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    "An unexpected error occurred while processing your request".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error,
            "message": message,
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
