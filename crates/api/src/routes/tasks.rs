//! Read-only handlers: task status, result retrieval, and job listing.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use pixelift_core::task::Task;
use pixelift_core::types::{TaskId, Timestamp};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Parse a raw path segment into a task id.
///
/// Ids the service never issued (malformed UUIDs included) read as Not
/// Found, exactly like expired ones; the extractor must not leak a
/// different status for garbage input.
fn parse_task_id(raw: &str) -> Result<TaskId, AppError> {
    TaskId::parse_str(raw).map_err(|_| AppError::UnknownTask(raw.to_string()))
}

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

/// One task as reported by `/status/{id}` and `/jobs`.
#[derive(Serialize)]
struct TaskView {
    task_id: TaskId,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    created_at: Timestamp,
}

impl From<Task> for TaskView {
    fn from(task: Task) -> Self {
        Self {
            task_id: task.id,
            status: task.status.as_str(),
            reason: task.status.reason().map(str::to_string),
            created_at: task.created_at,
        }
    }
}

#[derive(Serialize)]
struct JobsResponse {
    jobs: Vec<TaskView>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /status/{id}
///
/// Current lifecycle state of a task. 404 for unknown or expired ids,
/// with no distinction between the two.
async fn status_of(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<TaskView>> {
    let id = parse_task_id(&raw_id)?;
    let task = state.query.status_of(id).await?;
    Ok(Json(task.into()))
}

/// GET /result/{id}
///
/// The transformed JPEG bytes of a completed task. 404 for unknown or
/// expired ids; 400 (with the current status) when the task exists but
/// has not completed.
async fn result_of(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let id = parse_task_id(&raw_id)?;
    let bytes = state.query.result_of(id).await?;
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes))
}

/// GET /jobs
///
/// Every live task, in no guaranteed order.
async fn list_jobs(State(state): State<AppState>) -> Json<JobsResponse> {
    let jobs = state
        .query
        .list_jobs()
        .await
        .into_iter()
        .map(TaskView::from)
        .collect();
    Json(JobsResponse { jobs })
}

/// Mount the task query routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status/{id}", get(status_of))
        .route("/result/{id}", get(result_of))
        .route("/jobs", get(list_jobs))
}
