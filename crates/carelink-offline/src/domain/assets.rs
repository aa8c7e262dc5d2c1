//! Requests and responses flowing through the shell asset cache.

use serde::{Deserialize, Serialize};

/// Whether a request is a full-page navigation or a sub-resource load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// Full-page navigation: served network-first.
    Navigate,
    /// Script/style/image/etc.: served cache-first.
    Subresource,
}

/// What kind of resource the request is for. Only `Image` changes behaviour
/// (a placeholder is served when the fetch fails entirely).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestDestination {
    Document,
    Script,
    Style,
    Image,
    Other,
}

/// A request intercepted by the worker's fetch handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub url: String,
    pub mode: RequestMode,
    pub destination: RequestDestination,
}

impl AssetRequest {
    /// A full-page navigation request.
    pub fn navigation(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: RequestMode::Navigate,
            destination: RequestDestination::Document,
        }
    }

    /// A sub-resource request.
    pub fn subresource(url: impl Into<String>, destination: RequestDestination) -> Self {
        Self {
            url: url.into(),
            mode: RequestMode::Subresource,
            destination,
        }
    }
}

/// Origin classification of a fetched response, as reported by the fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseOrigin {
    /// Same-origin, fully visible response.
    SameOrigin,
    /// Cross-origin (possibly opaque) response: passed through, never cached.
    CrossOrigin,
}

/// A live response from the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResponse {
    pub status: u16,
    pub origin: ResponseOrigin,
    pub body: Vec<u8>,
}

impl FetchedResponse {
    /// Only successful same-origin responses are stored in the cache;
    /// cross-origin and error responses pass through unmodified.
    pub fn is_cacheable(&self) -> bool {
        self.origin == ResponseOrigin::SameOrigin && self.status == 200
    }
}

/// Where a served response came from. The tag makes every fetch-handler
/// outcome observable to callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedVia {
    Network,
    Cache,
    FallbackPage,
    PlaceholderImage,
}

/// The response the fetch handler hands back to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedResponse {
    pub body: Vec<u8>,
    pub via: ServedVia,
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_same_origin_200_responses_are_cacheable() {
        let ok = FetchedResponse {
            status: 200,
            origin: ResponseOrigin::SameOrigin,
            body: vec![1],
        };
        let cross = FetchedResponse {
            status: 200,
            origin: ResponseOrigin::CrossOrigin,
            body: vec![1],
        };
        let error = FetchedResponse {
            status: 500,
            origin: ResponseOrigin::SameOrigin,
            body: vec![],
        };

        assert!(ok.is_cacheable());
        assert!(!cross.is_cacheable());
        assert!(!error.is_cacheable());
    }

    #[test]
    fn test_request_constructors_set_mode_and_destination() {
        let nav = AssetRequest::navigation("/dashboard");
        assert_eq!(nav.mode, RequestMode::Navigate);
        assert_eq!(nav.destination, RequestDestination::Document);

        let img = AssetRequest::subresource("/logo.svg", RequestDestination::Image);
        assert_eq!(img.mode, RequestMode::Subresource);
        assert_eq!(img.destination, RequestDestination::Image);
    }
}
