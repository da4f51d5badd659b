//! Task Store: keyed access to task metadata and result blobs with expiry.
//!
//! [`TaskStore`] is the seam between the lifecycle/query layers and the
//! actual storage. Every record carries a time-to-live fixed at creation
//! (default 24 h) and reads as absent once expired; callers cannot tell
//! "expired" apart from "never existed".
//!
//! [`memory::MemoryStore`] is the in-process implementation.

pub mod memory;

use pixelift_core::task::{Task, TaskStatus};
use pixelift_core::types::TaskId;

pub use memory::MemoryStore;

/// Default retention window for task metadata and results.
pub const DEFAULT_TTL_SECS: u64 = 24 * 60 * 60;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors returned by store write operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A task with this id already exists (ids are never reused).
    #[error("Task {0} already exists")]
    DuplicateId(TaskId),

    /// The task does not exist or has expired.
    #[error("Task {0} not found")]
    NotFound(TaskId),
}

// ---------------------------------------------------------------------------
// TaskStore
// ---------------------------------------------------------------------------

/// Keyed store for task records and their result blobs.
///
/// Field-level writes (`set_status`, `put_result`) are individually
/// atomic, but no atomicity is promised across fields: a reader may
/// observe a result blob before the matching `Completed` status lands.
/// No component depends on cross-field atomicity.
#[async_trait::async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert a new task record. The TTL clock starts here and is never
    /// extended by later writes.
    async fn create(&self, task: Task) -> Result<(), StoreError>;

    /// Fetch a task by id. `None` for unknown or expired ids.
    async fn get(&self, id: TaskId) -> Option<Task>;

    /// Overwrite the status of an existing task.
    async fn set_status(&self, id: TaskId, status: TaskStatus) -> Result<(), StoreError>;

    /// Store the result blob for an existing task. The blob inherits the
    /// task's original expiry deadline.
    async fn put_result(&self, id: TaskId, bytes: Vec<u8>) -> Result<(), StoreError>;

    /// Fetch the result blob. `None` for unknown or expired ids, or when
    /// no result has been stored.
    async fn get_result(&self, id: TaskId) -> Option<Vec<u8>>;

    /// All live task records, in no particular order.
    ///
    /// Snapshot-inconsistent: tasks created or expiring while a caller
    /// iterates the returned list are not reflected in it.
    async fn scan_all(&self) -> Vec<Task>;
}
