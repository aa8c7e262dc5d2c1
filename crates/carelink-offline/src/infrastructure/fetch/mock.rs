//! Canned-response test double for the asset fetcher.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::assets::{AssetRequest, FetchedResponse, ResponseOrigin};

use super::{AssetFetcher, FetchError};

/// Mock fetcher serving pre-registered responses by URL. Unregistered URLs
/// and any request made while `set_offline(true)` fail with a network error.
#[derive(Default)]
pub struct MockAssetFetcher {
    offline: AtomicBool,
    responses: Mutex<HashMap<String, FetchedResponse>>,
    fetch_count: AtomicUsize,
}

impl MockAssetFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates loss of connectivity for every subsequent fetch.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Registers a successful same-origin response for `url`.
    pub fn serve_ok(&self, url: &str, body: &[u8]) {
        self.serve(url, 200, ResponseOrigin::SameOrigin, body);
    }

    /// Registers a cross-origin response for `url`.
    pub fn serve_cross_origin(&self, url: &str, body: &[u8]) {
        self.serve(url, 200, ResponseOrigin::CrossOrigin, body);
    }

    /// Registers an error-status response for `url`.
    pub fn serve_error(&self, url: &str, status: u16) {
        self.serve(url, status, ResponseOrigin::SameOrigin, b"");
    }

    fn serve(&self, url: &str, status: u16, origin: ResponseOrigin, body: &[u8]) {
        self.responses
            .lock()
            .expect("mock fetcher lock poisoned")
            .insert(
                url.to_string(),
                FetchedResponse {
                    status,
                    origin,
                    body: body.to_vec(),
                },
            );
    }

    /// Number of fetches attempted, including failed ones.
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssetFetcher for MockAssetFetcher {
    async fn fetch(&self, request: &AssetRequest) -> Result<FetchedResponse, FetchError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(FetchError::Network("offline".into()));
        }
        self.responses
            .lock()
            .expect("mock fetcher lock poisoned")
            .get(&request.url)
            .cloned()
            .ok_or_else(|| FetchError::Network(format!("no route to {}", request.url)))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
