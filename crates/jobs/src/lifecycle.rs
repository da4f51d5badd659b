//! The task state machine: create, dispatch, terminal write, webhook hand-off.
//!
//! [`LifecycleManager::submit`] records a `Pending` task and returns as
//! soon as that record is durably visible; the transform itself runs as
//! a detached tokio task. Dispatch failures are terminal for their task
//! and never escalate beyond it.

use std::sync::Arc;
use std::time::Instant;

use pixelift_core::task::{Task, TaskStatus};
use pixelift_core::types::TaskId;
use pixelift_notify::Notifier;
use pixelift_store::{StoreError, TaskStore};
use pixelift_upscaler::Upscaler;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors surfaced to the caller of [`LifecycleManager::submit`].
///
/// Only the initial `Pending` write can fail here; everything after it
/// happens inside the detached dispatch and resolves to a `Failed` task
/// instead of an error return.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Failed to record task: {0}")]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Tunable lifecycle behaviour.
#[derive(Debug, Clone, Default)]
pub struct LifecycleOptions {
    /// Whether a task that ends `Failed` also notifies its webhook URL
    /// (with a JSON failure payload). Off by default: completed results
    /// are the only notification the original consumer expects.
    pub notify_on_failure: bool,
}

// ---------------------------------------------------------------------------
// LifecycleManager
// ---------------------------------------------------------------------------

/// Owns every write to task state. Constructed once at startup with its
/// collaborators injected; cheap to clone.
#[derive(Clone)]
pub struct LifecycleManager {
    store: Arc<dyn TaskStore>,
    upscaler: Arc<dyn Upscaler>,
    notifier: Arc<dyn Notifier>,
    options: LifecycleOptions,
}

impl LifecycleManager {
    pub fn new(
        store: Arc<dyn TaskStore>,
        upscaler: Arc<dyn Upscaler>,
        notifier: Arc<dyn Notifier>,
        options: LifecycleOptions,
    ) -> Self {
        Self {
            store,
            upscaler,
            notifier,
            options,
        }
    }

    /// Record a new `Pending` task and schedule its transform.
    ///
    /// Returns once the task record is visible to readers. The dispatch
    /// runs detached; the caller gets no handle to it and cannot cancel
    /// it.
    pub async fn submit(
        &self,
        bytes: Vec<u8>,
        content_type: String,
        webhook_url: Option<String>,
    ) -> Result<TaskId, SubmitError> {
        let task = Task::new(webhook_url);
        let task_id = task.id;
        self.store.create(task).await?;

        tracing::info!(%task_id, size = bytes.len(), "Task submitted");

        let manager = self.clone();
        tokio::spawn(async move {
            manager.dispatch(task_id, bytes, content_type).await;
        });

        Ok(task_id)
    }

    /// Run one task to its terminal state.
    ///
    /// Every store error in here is logged and swallowed: by this point
    /// the task either expired mid-flight (nothing left to update) or
    /// the store is unhealthy, and neither may take the process down.
    async fn dispatch(&self, task_id: TaskId, bytes: Vec<u8>, content_type: String) {
        let started = Instant::now();

        if let Err(e) = self.store.set_status(task_id, TaskStatus::Processing).await {
            tracing::error!(%task_id, error = %e, "Could not mark task as processing");
            return;
        }

        match self.upscaler.transform(bytes, &content_type).await {
            Ok(result) => self.complete(task_id, result, started).await,
            Err(e) => {
                let reason = e.to_string();
                tracing::error!(
                    %task_id,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %reason,
                    "Transform failed"
                );
                self.fail(task_id, reason).await;
            }
        }
    }

    /// Write the result, then the `Completed` status, then notify.
    ///
    /// The result blob must land before the status so that any reader
    /// observing `Completed` also finds the result.
    async fn complete(&self, task_id: TaskId, result: Vec<u8>, started: Instant) {
        if let Err(e) = self.store.put_result(task_id, result.clone()).await {
            tracing::error!(%task_id, error = %e, "Could not store result");
            return;
        }
        if let Err(e) = self.store.set_status(task_id, TaskStatus::Completed).await {
            tracing::error!(%task_id, error = %e, "Could not mark task as completed");
            return;
        }

        tracing::info!(
            %task_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            result_bytes = result.len(),
            "Task completed"
        );

        if let Some(url) = self.webhook_url(task_id).await {
            if let Err(e) = self.notifier.notify_completed(&url, task_id, &result).await {
                // Best-effort: the task stays completed and its result
                // stays retrievable whatever happens to the webhook.
                tracing::warn!(%task_id, url, error = %e, "Completion webhook failed");
            }
        }
    }

    /// Write the terminal `Failed` status and optionally notify.
    async fn fail(&self, task_id: TaskId, reason: String) {
        let status = TaskStatus::Failed {
            reason: reason.clone(),
        };
        if let Err(e) = self.store.set_status(task_id, status).await {
            tracing::error!(%task_id, error = %e, "Could not mark task as failed");
            return;
        }

        if self.options.notify_on_failure {
            if let Some(url) = self.webhook_url(task_id).await {
                if let Err(e) = self.notifier.notify_failed(&url, task_id, &reason).await {
                    tracing::warn!(%task_id, url, error = %e, "Failure webhook failed");
                }
            }
        }
    }

    async fn webhook_url(&self, task_id: TaskId) -> Option<String> {
        self.store.get(task_id).await.and_then(|t| t.webhook_url)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
