//! Network fetch seam used by the shell cache.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::assets::{AssetRequest, FetchedResponse};

pub mod mock;

/// Error type for network fetches.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request could not be completed, e.g. the device is offline.
    #[error("network fetch failed: {0}")]
    Network(String),
}

/// Fetches assets over the network. Implemented by the HTTP client in
/// production and by [`mock::MockAssetFetcher`] in tests.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Performs the request against the network. A response with a non-200
    /// status is still `Ok`; only transport-level failures are `Err`.
    async fn fetch(&self, request: &AssetRequest) -> Result<FetchedResponse, FetchError>;
}
