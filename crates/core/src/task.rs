//! The task record and its lifecycle state machine.
//!
//! A [`Task`] represents one requested transform. Its [`TaskStatus`]
//! moves strictly forward: `Pending → Processing → {Completed, Failed}`.
//! Terminal states are final. [`TaskStatus::can_transition_to`] spells
//! out which moves are legal; the store itself does not police writes,
//! so monotonicity rests on the lifecycle manager being the only status
//! writer and only ever driving a task forward.

use serde::{Deserialize, Serialize};

use crate::types::{TaskId, Timestamp};

// ---------------------------------------------------------------------------
// TaskStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of a task.
///
/// Failure carries its reason as data rather than being encoded into a
/// status string, so status comparisons are never substring checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Processing,
    Completed,
    Failed { reason: String },
}

impl TaskStatus {
    /// Stable lowercase name of the status, without any failure reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Processing => "processing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed { .. } => "failed",
        }
    }

    /// Failure reason, if this is a `Failed` status.
    pub fn reason(&self) -> Option<&str> {
        match self {
            TaskStatus::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    /// Whether this status permits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed { .. })
    }

    /// Whether moving from `self` to `next` is a legal forward transition.
    ///
    /// Legal moves: `Pending → Processing`, `Processing → Completed`,
    /// `Processing → Failed`. Everything else (backward moves, terminal →
    /// anything, skipping `Processing`) is rejected.
    pub fn can_transition_to(&self, next: &TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::Processing)
                | (TaskStatus::Processing, TaskStatus::Completed)
                | (TaskStatus::Processing, TaskStatus::Failed { .. })
        )
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Failed { reason } => write!(f, "failed: {reason}"),
            other => f.write_str(other.as_str()),
        }
    }
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// A persisted record representing one requested transform.
///
/// `id`, `created_at`, and `webhook_url` are set once at creation and
/// never change; only `status` is mutated afterwards, by the lifecycle
/// manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(flatten)]
    pub status: TaskStatus,
    pub created_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl Task {
    /// Create a fresh `Pending` task with a newly generated id.
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            status: TaskStatus::Pending,
            created_at: chrono::Utc::now(),
            webhook_url,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
