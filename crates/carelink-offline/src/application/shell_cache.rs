//! Versioned shell asset cache and its fetch strategies.
//!
//! Install fetches the full shell manifest into the active generation and
//! fails atomically if any asset cannot be fetched. Activate purges every
//! generation other than the active one. The fetch handler then serves:
//!
//! - navigations network-first, falling back to cache and then to the
//!   offline fallback page;
//! - sub-resources cache-first, caching only successful same-origin
//!   responses, with an image placeholder when an image fetch fails;
//! - remote-data-service requests not at all: they bypass the cache so
//!   their natural failure reaches the pending-write queue.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::assets::{
    AssetRequest, RequestDestination, RequestMode, ServedResponse, ServedVia,
};
use crate::domain::config::OfflineConfig;
use crate::infrastructure::cache::{CacheError, CacheStorage, CachedAsset};
use crate::infrastructure::fetch::{AssetFetcher, FetchError};

/// Error type for shell cache operations.
#[derive(Debug, Error)]
pub enum ShellCacheError {
    /// A manifest asset could not be fetched during install.
    #[error("install failed fetching manifest asset {url}: {source}")]
    ManifestFetch {
        url: String,
        #[source]
        source: FetchError,
    },

    /// A manifest asset came back non-cacheable during install.
    #[error("install failed: manifest asset {url} returned status {status}")]
    ManifestNotCacheable { url: String, status: u16 },

    /// Cache persistence failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// A non-image sub-resource could not be fetched and had no cached copy.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The offline fallback page (or image placeholder) is not in the cache.
    #[error("offline fallback asset {url} missing from cache")]
    FallbackMissing { url: String },
}

/// The shell asset cache service.
pub struct ShellCache {
    storage: CacheStorage,
    fetcher: Arc<dyn AssetFetcher>,
    config: OfflineConfig,
}

impl ShellCache {
    pub fn new(storage: CacheStorage, fetcher: Arc<dyn AssetFetcher>, config: OfflineConfig) -> Self {
        Self {
            storage,
            fetcher,
            config,
        }
    }

    /// Caches the full shell manifest into the active generation.
    ///
    /// All-or-nothing: nothing is written unless every manifest asset
    /// fetched successfully, so a half-installed shell never activates.
    pub async fn install(&self) -> Result<(), ShellCacheError> {
        let mut batch = Vec::with_capacity(self.config.shell_manifest.len());
        for url in &self.config.shell_manifest {
            let request = AssetRequest::navigation(url.clone());
            let response =
                self.fetcher
                    .fetch(&request)
                    .await
                    .map_err(|source| ShellCacheError::ManifestFetch {
                        url: url.clone(),
                        source,
                    })?;
            if !response.is_cacheable() {
                return Err(ShellCacheError::ManifestNotCacheable {
                    url: url.clone(),
                    status: response.status,
                });
            }
            batch.push((
                url.clone(),
                CachedAsset {
                    status: response.status,
                    body: response.body,
                },
            ));
        }
        self.storage.put_all(&self.config.cache_generation, batch)?;
        info!(
            generation = %self.config.cache_generation,
            assets = self.config.shell_manifest.len(),
            "shell manifest installed"
        );
        Ok(())
    }

    /// Deletes every cache generation other than the active one. Returns
    /// the number of generations purged.
    pub async fn activate(&self) -> Result<usize, ShellCacheError> {
        let mut purged = 0;
        for generation in self.storage.list_generations()? {
            if generation != self.config.cache_generation {
                self.storage.delete_generation(&generation)?;
                info!(%generation, "purged stale cache generation");
                purged += 1;
            }
        }
        Ok(purged)
    }

    /// Serves one intercepted request, or `None` when the request targets
    /// the remote data service and must pass through untouched.
    pub async fn handle_fetch(
        &self,
        request: &AssetRequest,
    ) -> Result<Option<ServedResponse>, ShellCacheError> {
        if self.config.is_remote_service(&request.url) {
            debug!(url = %request.url, "remote data service request, not intercepting");
            return Ok(None);
        }
        let served = match request.mode {
            RequestMode::Navigate => self.serve_navigation(request).await?,
            RequestMode::Subresource => self.serve_subresource(request).await?,
        };
        Ok(Some(served))
    }

    /// Network-first: a live response always wins, cacheable ones refresh
    /// the cache. Offline falls back to the cached copy, then to the
    /// offline fallback page.
    async fn serve_navigation(&self, request: &AssetRequest) -> Result<ServedResponse, ShellCacheError> {
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.is_cacheable() {
                    self.storage.put(
                        &self.config.cache_generation,
                        &request.url,
                        CachedAsset {
                            status: response.status,
                            body: response.body.clone(),
                        },
                    )?;
                }
                Ok(ServedResponse {
                    body: response.body,
                    via: ServedVia::Network,
                })
            }
            Err(e) => {
                warn!(url = %request.url, error = %e, "navigation fetch failed, falling back to cache");
                if let Some(cached) = self.storage.get(&self.config.cache_generation, &request.url)? {
                    return Ok(ServedResponse {
                        body: cached.body,
                        via: ServedVia::Cache,
                    });
                }
                let fallback = self
                    .storage
                    .get(&self.config.cache_generation, &self.config.offline_fallback_url)?
                    .ok_or_else(|| ShellCacheError::FallbackMissing {
                        url: self.config.offline_fallback_url.clone(),
                    })?;
                Ok(ServedResponse {
                    body: fallback.body,
                    via: ServedVia::FallbackPage,
                })
            }
        }
    }

    /// Cache-first: a cached copy is served without touching the network.
    /// Misses go to the network and cacheable responses are stored. Failed
    /// image fetches degrade to the placeholder; other failures propagate.
    async fn serve_subresource(&self, request: &AssetRequest) -> Result<ServedResponse, ShellCacheError> {
        if let Some(cached) = self.storage.get(&self.config.cache_generation, &request.url)? {
            return Ok(ServedResponse {
                body: cached.body,
                via: ServedVia::Cache,
            });
        }
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.is_cacheable() {
                    self.storage.put(
                        &self.config.cache_generation,
                        &request.url,
                        CachedAsset {
                            status: response.status,
                            body: response.body.clone(),
                        },
                    )?;
                }
                Ok(ServedResponse {
                    body: response.body,
                    via: ServedVia::Network,
                })
            }
            Err(e) if request.destination == RequestDestination::Image => {
                warn!(url = %request.url, error = %e, "image fetch failed, serving placeholder");
                let placeholder = self
                    .storage
                    .get(&self.config.cache_generation, &self.config.placeholder_image_url)?
                    .ok_or_else(|| ShellCacheError::FallbackMissing {
                        url: self.config.placeholder_image_url.clone(),
                    })?;
                Ok(ServedResponse {
                    body: placeholder.body,
                    via: ServedVia::PlaceholderImage,
                })
            }
            Err(e) => Err(ShellCacheError::Fetch(e)),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
