//! Persistent pending-write queue with at-least-once replay.
//!
//! Enqueue parks a failed user action in the store; replay walks one kind's
//! partition and delivers each entry to the remote data service, deleting
//! the local copy only after the service has confirmed it. A crash between
//! confirmation and deletion re-delivers the entry on the next replay, so
//! the remote service must treat writes as idempotent by id.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::entry::{PendingWrite, WriteKind};
use crate::infrastructure::remote::RemoteDataService;
use crate::infrastructure::store::{KvStore, StorageError};

/// Outcome of one replay pass over a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplayReport {
    /// Entries found in the partition when the pass started.
    pub attempted: usize,
    /// Entries confirmed by the remote service and deleted locally.
    pub delivered: usize,
    /// Entries still pending after the pass (delivery failed or malformed).
    pub remaining: usize,
}

/// The pending-write queue.
pub struct PendingWriteQueue {
    store: Arc<KvStore>,
    remote: Arc<dyn RemoteDataService>,
}

impl PendingWriteQueue {
    pub fn new(store: Arc<KvStore>, remote: Arc<dyn RemoteDataService>) -> Self {
        Self { store, remote }
    }

    /// Parks a write in its kind's partition. Re-enqueueing the same id
    /// overwrites the previous copy.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the store itself cannot accept the
    /// entry; the caller must surface that to the user instead of
    /// pretending the action was saved.
    pub fn enqueue(&self, write: &PendingWrite) -> Result<(), StorageError> {
        let value = serde_json::to_value(write)?;
        self.store.put(write.kind.partition(), &write.id, value)?;
        debug!(id = %write.id, kind = ?write.kind, "parked pending write");
        Ok(())
    }

    /// Every entry currently pending for `kind`. Entries that no longer
    /// decode are skipped with a warning.
    pub fn list_pending(&self, kind: WriteKind) -> Result<Vec<PendingWrite>, StorageError> {
        let mut pending = Vec::new();
        for value in self.store.get_all(kind.partition())? {
            match serde_json::from_value::<PendingWrite>(value) {
                Ok(write) => pending.push(write),
                Err(e) => warn!(partition = kind.partition(), error = %e, "skipping malformed pending entry"),
            }
        }
        Ok(pending)
    }

    /// Number of entries pending for `kind`, decodable or not.
    pub fn pending_count(&self, kind: WriteKind) -> Result<usize, StorageError> {
        self.store.len(kind.partition())
    }

    /// Replays every pending write of `kind` against the remote service.
    ///
    /// Per-entry delivery failures are logged and leave the entry queued for
    /// the next pass; only store failures abort the pass. One failed entry
    /// never blocks the others.
    pub async fn replay(&self, kind: WriteKind) -> Result<ReplayReport, StorageError> {
        let pending = self.list_pending(kind)?;
        let attempted = self.pending_count(kind)?;
        let mut delivered = 0;

        for write in pending {
            match self.remote.write(kind, &write.payload).await {
                Ok(()) => {
                    self.store.delete(kind.partition(), &write.id)?;
                    delivered += 1;
                }
                Err(e) => {
                    warn!(id = %write.id, kind = ?kind, error = %e, "replay delivery failed, entry stays queued");
                }
            }
        }

        let remaining = self.pending_count(kind)?;
        let report = ReplayReport {
            attempted,
            delivered,
            remaining,
        };
        info!(kind = ?kind, ?report, "replay pass finished");
        Ok(report)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::remote::mock::MockRemoteService;
    use serde_json::json;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn queue_with_mock() -> (PendingWriteQueue, Arc<MockRemoteService>, PathBuf) {
        let root = std::env::temp_dir().join(format!("carelink_queue_{}", Uuid::new_v4()));
        let store = Arc::new(
            KvStore::open(&root, 1, &["pending-appointments", "pending-messages"])
                .expect("open store"),
        );
        let remote = Arc::new(MockRemoteService::new());
        (
            PendingWriteQueue::new(store, remote.clone()),
            remote,
            root,
        )
    }

    #[tokio::test]
    async fn test_replay_delivers_and_deletes_each_entry() {
        // Arrange
        let (queue, remote, root) = queue_with_mock();
        queue
            .enqueue(&PendingWrite::new(
                "a1",
                WriteKind::Appointment,
                json!({"id": "a1"}),
            ))
            .unwrap();
        queue
            .enqueue(&PendingWrite::new(
                "a2",
                WriteKind::Appointment,
                json!({"id": "a2"}),
            ))
            .unwrap();

        // Act
        let report = queue.replay(WriteKind::Appointment).await.unwrap();

        // Assert
        assert_eq!(report.attempted, 2);
        assert_eq!(report.delivered, 2);
        assert_eq!(report.remaining, 0);
        assert_eq!(remote.delivered_count(), 2);
        assert_eq!(queue.pending_count(WriteKind::Appointment).unwrap(), 0);

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn test_failed_delivery_keeps_the_entry_and_does_not_block_others() {
        // Arrange
        let (queue, remote, root) = queue_with_mock();
        remote.fail_id("m1");
        queue
            .enqueue(&PendingWrite::new(
                "m1",
                WriteKind::Message,
                json!({"id": "m1"}),
            ))
            .unwrap();
        queue
            .enqueue(&PendingWrite::new(
                "m2",
                WriteKind::Message,
                json!({"id": "m2"}),
            ))
            .unwrap();

        // Act
        let report = queue.replay(WriteKind::Message).await.unwrap();

        // Assert – m2 delivered, m1 still queued
        assert_eq!(report.delivered, 1);
        assert_eq!(report.remaining, 1);
        let pending = queue.list_pending(WriteKind::Message).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "m1");

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn test_second_replay_after_recovery_drains_the_queue() {
        // Arrange
        let (queue, remote, root) = queue_with_mock();
        remote.set_fail_all(true);
        queue
            .enqueue(&PendingWrite::new(
                "a1",
                WriteKind::Appointment,
                json!({"id": "a1"}),
            ))
            .unwrap();
        let first = queue.replay(WriteKind::Appointment).await.unwrap();
        assert_eq!(first.delivered, 0);
        assert_eq!(first.remaining, 1);

        // Act – connectivity returns
        remote.set_fail_all(false);
        let second = queue.replay(WriteKind::Appointment).await.unwrap();

        // Assert
        assert_eq!(second.delivered, 1);
        assert_eq!(second.remaining, 0);

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn test_enqueue_with_same_id_keeps_a_single_copy() {
        let (queue, _remote, root) = queue_with_mock();

        queue
            .enqueue(&PendingWrite::new(
                "a1",
                WriteKind::Appointment,
                json!({"id": "a1", "time": "09:00"}),
            ))
            .unwrap();
        queue
            .enqueue(&PendingWrite::new(
                "a1",
                WriteKind::Appointment,
                json!({"id": "a1", "time": "10:00"}),
            ))
            .unwrap();

        let pending = queue.list_pending(WriteKind::Appointment).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].payload["time"], "10:00");

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn test_kinds_replay_independently() {
        // A message replay must not touch queued appointments.
        let (queue, _remote, root) = queue_with_mock();
        queue
            .enqueue(&PendingWrite::new(
                "a1",
                WriteKind::Appointment,
                json!({"id": "a1"}),
            ))
            .unwrap();
        queue
            .enqueue(&PendingWrite::new(
                "m1",
                WriteKind::Message,
                json!({"id": "m1"}),
            ))
            .unwrap();

        let report = queue.replay(WriteKind::Message).await.unwrap();

        assert_eq!(report.delivered, 1);
        assert_eq!(queue.pending_count(WriteKind::Appointment).unwrap(), 1);

        std::fs::remove_dir_all(&root).ok();
    }
}
