use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use swipegen_core::error::{CoreError, GenerationError};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for request validation and [`GenerationError`] for
/// queue failures. Implements [`IntoResponse`] to produce consistent JSON
/// error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `swipegen_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The queue or a collaborator behind it failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(CoreError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }

            AppError::Generation(GenerationError::Queue(msg)) => {
                tracing::error!(error = %msg, "Queue error");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "QUEUE_UNAVAILABLE",
                    "The generation queue is unavailable".to_string(),
                )
            }
            AppError::Generation(err) => {
                tracing::error!(error = %err, "Generation error");
                internal_error()
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal_error() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
