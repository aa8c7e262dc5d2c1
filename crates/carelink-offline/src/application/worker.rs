//! Dispatch of host lifecycle events onto the offline services.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::application::shell_cache::{ShellCache, ShellCacheError};
use crate::application::sync_queue::PendingWriteQueue;
use crate::domain::assets::ServedResponse;
use crate::domain::entry::WriteKind;
use crate::domain::worker::WorkerEvent;
use crate::infrastructure::notify::NotificationSink;
use crate::infrastructure::store::StorageError;

/// Error type for event handling.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Cache(#[from] ShellCacheError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The background worker. Owns the two offline services and maps each host
/// event onto them; it has no loop or scheduling of its own.
pub struct OfflineWorker {
    queue: PendingWriteQueue,
    cache: ShellCache,
    notifier: Arc<dyn NotificationSink>,
}

impl OfflineWorker {
    pub fn new(
        queue: PendingWriteQueue,
        cache: ShellCache,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            queue,
            cache,
            notifier,
        }
    }

    pub fn queue(&self) -> &PendingWriteQueue {
        &self.queue
    }

    pub fn cache(&self) -> &ShellCache {
        &self.cache
    }

    /// Handles one host lifecycle event. Only `Fetch` produces a response;
    /// every other event resolves to `None` once its work is durable.
    ///
    /// Unknown sync tags are logged and ignored so a stale host
    /// registration can never wedge the worker.
    pub async fn handle_event(
        &self,
        event: WorkerEvent,
    ) -> Result<Option<ServedResponse>, WorkerError> {
        match event {
            WorkerEvent::Install => {
                self.cache.install().await?;
                Ok(None)
            }
            WorkerEvent::Activate => {
                self.cache.activate().await?;
                Ok(None)
            }
            WorkerEvent::Fetch(request) => Ok(self.cache.handle_fetch(&request).await?),
            WorkerEvent::Sync { tag } => {
                match WriteKind::from_sync_tag(&tag) {
                    Some(kind) => {
                        let report = self.queue.replay(kind).await?;
                        info!(%tag, delivered = report.delivered, remaining = report.remaining, "sync handled");
                    }
                    None => warn!(%tag, "ignoring sync event with unknown tag"),
                }
                Ok(None)
            }
            WorkerEvent::Push(notification) => {
                self.notifier.show(&notification);
                Ok(None)
            }
            WorkerEvent::NotificationClick { url } => {
                self.notifier.open_window(&url);
                Ok(None)
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
