use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use pixelift_jobs::{QueryError, SubmitError};
use pixelift_upscaler::UpscaleError;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain errors of the lifecycle, query, and upscale layers
/// and implements [`IntoResponse`] to produce consistent JSON error
/// responses with the status codes the API contract promises.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The request itself is unacceptable; no task was created.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The path id is not a well-formed task id. Reported as Not Found
    /// so callers cannot tell malformed ids apart from expired ones.
    #[error("Task {0} not found")]
    UnknownTask(String),

    /// A query-layer error (unknown task, result not ready).
    #[error(transparent)]
    Query(#[from] QueryError),

    /// A synchronous transform failed.
    #[error(transparent)]
    Upscale(#[from] UpscaleError),

    /// Recording a new task failed.
    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }

            AppError::UnknownTask(id) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Task {id} not found"),
            ),

            AppError::Query(query) => match query {
                QueryError::NotFound(id) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("Task {id} not found"),
                ),
                QueryError::NotReady(current) => (
                    StatusCode::BAD_REQUEST,
                    "NOT_COMPLETED",
                    format!("Task is not completed yet (current status: {current})"),
                ),
            },

            AppError::Upscale(upscale) => match upscale {
                UpscaleError::InvalidInput(_) => {
                    (StatusCode::BAD_REQUEST, "INVALID_IMAGE", upscale.to_string())
                }
                UpscaleError::TooLarge(_) => (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    "IMAGE_TOO_LARGE",
                    upscale.to_string(),
                ),
                UpscaleError::UpstreamFailure(_) | UpscaleError::Timeout(_) => {
                    tracing::error!(error = %upscale, "Upstream transform failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "UPSTREAM_ERROR",
                        "Image processing failed".to_string(),
                    )
                }
            },

            AppError::Submit(submit) => {
                tracing::error!(error = %submit, "Failed to enqueue task");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "ENQUEUE_FAILED",
                    "Failed to enqueue task".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
