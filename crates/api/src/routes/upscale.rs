//! Handlers for the `/upscale` resource: the synchronous passthrough and
//! asynchronous submission.
//!
//! Both accept a multipart form with a required `image` file part. The
//! async endpoint additionally takes an optional `webhook_url` (query
//! parameter or form field) to be notified on completion.

use axum::extract::{Multipart, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use pixelift_core::types::TaskId;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Upload extraction
// ---------------------------------------------------------------------------

/// The parts extracted from an upload form.
struct Upload {
    bytes: Vec<u8>,
    content_type: String,
    webhook_url: Option<String>,
}

/// Pull the `image` file (and an optional `webhook_url` field) out of a
/// multipart form, validating before any state is touched.
///
/// Rejections (missing part, missing or non-`image/*` content type)
/// surface as 400 and never create a task.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    let mut image: Option<(Vec<u8>, String)> = None;
    let mut webhook_url: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let content_type = field
                    .content_type()
                    .ok_or_else(|| {
                        AppError::Validation("File must be an image".to_string())
                    })?
                    .to_string();
                if !content_type.starts_with("image/") {
                    return Err(AppError::Validation("File must be an image".to_string()));
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
                image = Some((bytes.to_vec(), content_type));
            }
            Some("webhook_url") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
                if !value.is_empty() {
                    webhook_url = Some(value);
                }
            }
            _ => {}
        }
    }

    let (bytes, content_type) =
        image.ok_or_else(|| AppError::Validation("Missing 'image' file field".to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::Validation("Uploaded image is empty".to_string()));
    }

    Ok(Upload {
        bytes,
        content_type,
        webhook_url,
    })
}

// ---------------------------------------------------------------------------
// Sync
// ---------------------------------------------------------------------------

/// POST /upscale
///
/// Blocks until the backend responds and returns the transformed JPEG
/// bytes directly. No task is created and nothing persists.
async fn upscale_sync(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let upload = read_upload(multipart).await?;

    let output = state
        .sync
        .upscale_now(upload.bytes, &upload.content_type)
        .await?;

    Ok(([(header::CONTENT_TYPE, "image/jpeg")], output))
}

// ---------------------------------------------------------------------------
// Async
// ---------------------------------------------------------------------------

/// Optional query parameters for async submission.
#[derive(Deserialize)]
struct SubmitParams {
    webhook_url: Option<String>,
}

/// Response payload for a successful async submission.
#[derive(Serialize)]
struct SubmitResponse {
    task_id: TaskId,
}

/// POST /upscale/async
///
/// Records the task and returns its id immediately; the transform runs
/// detached. Poll `GET /status/{id}` or supply a `webhook_url`.
async fn upscale_async(
    State(state): State<AppState>,
    Query(params): Query<SubmitParams>,
    multipart: Multipart,
) -> AppResult<Json<SubmitResponse>> {
    let upload = read_upload(multipart).await?;
    // A form field wins over the query parameter when both are present.
    let webhook_url = upload.webhook_url.or(params.webhook_url);

    let task_id = state
        .lifecycle
        .submit(upload.bytes, upload.content_type, webhook_url)
        .await?;

    Ok(Json(SubmitResponse { task_id }))
}

/// Mount the upscale routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upscale", post(upscale_sync))
        .route("/upscale/async", post(upscale_async))
}
