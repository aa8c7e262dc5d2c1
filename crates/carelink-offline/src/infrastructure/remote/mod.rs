//! Upstream data service the pending-write queue replays into.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entry::WriteKind;

pub mod mock;

/// Error type for remote write delivery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteWriteError {
    /// The service could not be reached. The write should stay queued.
    #[error("network error delivering write: {0}")]
    Network(String),

    /// The service reached us but refused the write.
    #[error("remote service rejected write: {0}")]
    Rejected(String),
}

/// The remote data service writes are replayed against once connectivity
/// returns. Implemented by the HTTP client in production and by
/// [`mock::MockRemoteService`] in tests.
#[async_trait]
pub trait RemoteDataService: Send + Sync {
    /// Delivers one queued write. A returned `Ok` means the service has
    /// durably accepted it and the local copy may be deleted.
    async fn write(&self, kind: WriteKind, payload: &serde_json::Value)
        -> Result<(), RemoteWriteError>;
}
