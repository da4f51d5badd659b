//! In-process [`TaskStore`] implementation with per-record expiry.
//!
//! Records are checked lazily on every read, so an expired task is
//! invisible even before the sweeper removes it. [`MemoryStore::start_sweeper`]
//! spawns a periodic pass that reclaims the memory of expired entries.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use pixelift_core::task::{Task, TaskStatus};
use pixelift_core::types::TaskId;

use crate::{StoreError, TaskStore, DEFAULT_TTL_SECS};

/// How often the background sweeper reclaims expired records.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// One stored task plus its expiry deadline and optional result blob.
struct Record {
    task: Task,
    /// Fixed at creation; later writes never extend it.
    expires_at: DateTime<Utc>,
    result: Option<Vec<u8>>,
}

impl Record {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// In-memory task store. Cheap to clone; all clones share one map.
#[derive(Clone)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<TaskId, Record>>>,
    ttl: chrono::Duration,
}

impl MemoryStore {
    /// Create a store with the default 24-hour retention window.
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(DEFAULT_TTL_SECS))
    }

    /// Create a store with a custom retention window.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            ttl: chrono::Duration::from_std(ttl).expect("TTL out of range"),
        }
    }

    /// Spawn the periodic sweeper. Cancel the returned token's parent to
    /// stop it during shutdown.
    pub fn start_sweeper(&self, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let removed = store.sweep_expired().await;
                        if removed > 0 {
                            tracing::debug!(removed, "Swept expired task records");
                        }
                    }
                    () = cancel.cancelled() => {
                        tracing::debug!("Task store sweeper stopped");
                        return;
                    }
                }
            }
        })
    }

    /// Remove every expired record, returning how many were dropped.
    pub async fn sweep_expired(&self) -> usize {
        let now = Utc::now();
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, rec| !rec.is_expired(now));
        before - records.len()
    }

    /// Number of live (non-expired) records.
    pub async fn live_count(&self) -> usize {
        let now = Utc::now();
        let records = self.records.read().await;
        records.values().filter(|r| !r.is_expired(now)).count()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TaskStore for MemoryStore {
    async fn create(&self, task: Task) -> Result<(), StoreError> {
        let now = Utc::now();
        let mut records = self.records.write().await;
        // An expired record under the same id does not block re-creation,
        // although v4 ids make that collision practically unreachable.
        if let Some(existing) = records.get(&task.id) {
            if !existing.is_expired(now) {
                return Err(StoreError::DuplicateId(task.id));
            }
        }
        records.insert(
            task.id,
            Record {
                expires_at: task.created_at + self.ttl,
                task,
                result: None,
            },
        );
        Ok(())
    }

    async fn get(&self, id: TaskId) -> Option<Task> {
        let now = Utc::now();
        let records = self.records.read().await;
        records
            .get(&id)
            .filter(|rec| !rec.is_expired(now))
            .map(|rec| rec.task.clone())
    }

    async fn set_status(&self, id: TaskId, status: TaskStatus) -> Result<(), StoreError> {
        let now = Utc::now();
        let mut records = self.records.write().await;
        let rec = records
            .get_mut(&id)
            .filter(|rec| !rec.is_expired(now))
            .ok_or(StoreError::NotFound(id))?;
        rec.task.status = status;
        Ok(())
    }

    async fn put_result(&self, id: TaskId, bytes: Vec<u8>) -> Result<(), StoreError> {
        let now = Utc::now();
        let mut records = self.records.write().await;
        let rec = records
            .get_mut(&id)
            .filter(|rec| !rec.is_expired(now))
            .ok_or(StoreError::NotFound(id))?;
        rec.result = Some(bytes);
        Ok(())
    }

    async fn get_result(&self, id: TaskId) -> Option<Vec<u8>> {
        let now = Utc::now();
        let records = self.records.read().await;
        records
            .get(&id)
            .filter(|rec| !rec.is_expired(now))
            .and_then(|rec| rec.result.clone())
    }

    async fn scan_all(&self) -> Vec<Task> {
        let now = Utc::now();
        let records = self.records.read().await;
        records
            .values()
            .filter(|rec| !rec.is_expired(now))
            .map(|rec| rec.task.clone())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn task() -> Task {
        Task::new(None)
    }

    // -- create / get ---------------------------------------------------------

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = MemoryStore::new();
        let t = task();
        let id = t.id;
        store.create(t).await.unwrap();

        let fetched = store.get(id).await.unwrap();
        assert_eq!(fetched.id, id);
        assert_eq!(fetched.status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn create_rejects_duplicate_id() {
        let store = MemoryStore::new();
        let t = task();
        let id = t.id;
        store.create(t.clone()).await.unwrap();

        assert_matches!(
            store.create(t).await,
            Err(StoreError::DuplicateId(dup)) if dup == id
        );
    }

    #[tokio::test]
    async fn get_unknown_id_is_none() {
        let store = MemoryStore::new();
        assert!(store.get(uuid::Uuid::new_v4()).await.is_none());
    }

    // -- status ---------------------------------------------------------------

    #[tokio::test]
    async fn set_status_overwrites() {
        let store = MemoryStore::new();
        let t = task();
        let id = t.id;
        store.create(t).await.unwrap();

        store.set_status(id, TaskStatus::Processing).await.unwrap();
        assert_eq!(store.get(id).await.unwrap().status, TaskStatus::Processing);
    }

    #[tokio::test]
    async fn set_status_unknown_id_is_not_found() {
        let store = MemoryStore::new();
        let id = uuid::Uuid::new_v4();
        assert_matches!(
            store.set_status(id, TaskStatus::Processing).await,
            Err(StoreError::NotFound(missing)) if missing == id
        );
    }

    // -- results --------------------------------------------------------------

    #[tokio::test]
    async fn put_result_then_get_result_round_trips() {
        let store = MemoryStore::new();
        let t = task();
        let id = t.id;
        store.create(t).await.unwrap();

        store.put_result(id, vec![1, 2, 3]).await.unwrap();
        assert_eq!(store.get_result(id).await.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn get_result_before_put_is_none() {
        let store = MemoryStore::new();
        let t = task();
        let id = t.id;
        store.create(t).await.unwrap();

        assert!(store.get_result(id).await.is_none());
    }

    #[tokio::test]
    async fn put_result_unknown_id_is_not_found() {
        let store = MemoryStore::new();
        assert_matches!(
            store.put_result(uuid::Uuid::new_v4(), vec![]).await,
            Err(StoreError::NotFound(_))
        );
    }

    // -- scan -----------------------------------------------------------------

    #[tokio::test]
    async fn scan_all_returns_every_live_task() {
        let store = MemoryStore::new();
        let mut ids = std::collections::HashSet::new();
        for _ in 0..5 {
            let t = task();
            ids.insert(t.id);
            store.create(t).await.unwrap();
        }

        let scanned: std::collections::HashSet<_> =
            store.scan_all().await.into_iter().map(|t| t.id).collect();
        assert_eq!(scanned, ids);
    }

    // -- expiry ---------------------------------------------------------------

    #[tokio::test]
    async fn expired_records_read_as_absent() {
        let store = MemoryStore::with_ttl(Duration::from_millis(10));
        let t = task();
        let id = t.id;
        store.create(t).await.unwrap();
        store.put_result(id, vec![9]).await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(store.get(id).await.is_none());
        assert!(store.get_result(id).await.is_none());
        assert!(store.scan_all().await.is_empty());
        assert_matches!(
            store.set_status(id, TaskStatus::Processing).await,
            Err(StoreError::NotFound(_))
        );
    }

    #[tokio::test]
    async fn writes_never_extend_the_ttl() {
        let store = MemoryStore::with_ttl(Duration::from_millis(50));
        let t = task();
        let id = t.id;
        store.create(t).await.unwrap();

        // Keep writing past the deadline; the record must still expire.
        tokio::time::sleep(Duration::from_millis(30)).await;
        store.set_status(id, TaskStatus::Processing).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert!(store.get(id).await.is_none());
    }

    #[tokio::test]
    async fn sweep_reclaims_expired_records() {
        let store = MemoryStore::with_ttl(Duration::from_millis(10));
        store.create(task()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(store.sweep_expired().await, 1);
        assert_eq!(store.live_count().await, 0);
    }
}
