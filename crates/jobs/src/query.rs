//! Read-only projections over the task store.
//!
//! Nothing in here mutates state. Reads are eventually consistent with
//! an in-flight dispatch: a caller observes whatever the store has
//! committed at that instant.

use std::sync::Arc;

use pixelift_core::task::{Task, TaskStatus};
use pixelift_core::types::TaskId;
use pixelift_store::TaskStore;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors from query operations.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Unknown or expired task. Deliberately identical for both cases.
    #[error("Task {0} not found")]
    NotFound(TaskId),

    /// The task exists but has not completed; carries the status it is
    /// currently in so callers can report it.
    #[error("Task is not completed yet (current status: {0})")]
    NotReady(TaskStatus),
}

// ---------------------------------------------------------------------------
// QueryService
// ---------------------------------------------------------------------------

/// Read-only access to task state.
#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn TaskStore>,
}

impl QueryService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Current lifecycle state of a task.
    pub async fn status_of(&self, id: TaskId) -> Result<Task, QueryError> {
        self.store.get(id).await.ok_or(QueryError::NotFound(id))
    }

    /// The result bytes of a completed task.
    ///
    /// Distinguishes "unknown or expired" (`NotFound`) from "exists but
    /// not finished" (`NotReady`). Returns bytes only when the status is
    /// `Completed`, so data is never handed out ahead of the terminal
    /// write.
    pub async fn result_of(&self, id: TaskId) -> Result<Vec<u8>, QueryError> {
        let task = self.store.get(id).await.ok_or(QueryError::NotFound(id))?;
        if task.status != TaskStatus::Completed {
            return Err(QueryError::NotReady(task.status));
        }
        // Status is Completed, so the blob was written before it; its
        // absence means the record expired between the two reads.
        self.store
            .get_result(id)
            .await
            .ok_or(QueryError::NotFound(id))
    }

    /// Every live task, in no guaranteed order.
    pub async fn list_jobs(&self) -> Vec<Task> {
        self.store.scan_all().await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
