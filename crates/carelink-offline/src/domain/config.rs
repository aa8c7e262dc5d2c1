//! Offline layer configuration.
//!
//! [`OfflineConfig`] is a plain struct constructed once at startup; defaults
//! are suitable for tests and local development. There is no global state and
//! no environment reads inside the domain -- the host wiring populates this.

use std::path::PathBuf;

/// All runtime settings for the offline durability layer.
#[derive(Debug, Clone)]
pub struct OfflineConfig {
    /// Root directory of the persistent key-value store.
    pub store_root: PathBuf,
    /// Schema version of the key-value store; part of the on-disk layout.
    pub store_version: u32,
    /// Directory holding asset-cache generation snapshots.
    pub cache_dir: PathBuf,
    /// Name of the currently active cache generation. Bumped on every shell
    /// release; activation purges every other generation.
    pub cache_generation: String,
    /// Shell assets cached during install. Install fails (and is retried by
    /// the host) unless every one of these can be fetched.
    pub shell_manifest: Vec<String>,
    /// Page served when a navigation fails offline. Must be in the manifest.
    pub offline_fallback_url: String,
    /// Image served when an image sub-resource fetch fails entirely.
    /// Must be in the manifest.
    pub placeholder_image_url: String,
    /// Origin of the remote data service. Requests to it are never
    /// intercepted or cached: their failure feeds the pending-write queue.
    pub remote_service_origin: String,
}

impl OfflineConfig {
    /// Whether a URL targets the remote data service.
    pub fn is_remote_service(&self, url: &str) -> bool {
        url.starts_with(&self.remote_service_origin)
    }
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            store_root: PathBuf::from("carelink-offline-db"),
            store_version: 1,
            cache_dir: PathBuf::from("carelink-cache"),
            cache_generation: "carelink-shell-v1".to_string(),
            shell_manifest: vec![
                "/".to_string(),
                "/index.html".to_string(),
                "/offline.html".to_string(),
                "/assets/app.js".to_string(),
                "/assets/app.css".to_string(),
                "/logo.svg".to_string(),
                "/manifest.webmanifest".to_string(),
            ],
            offline_fallback_url: "/offline.html".to_string(),
            placeholder_image_url: "/logo.svg".to_string(),
            remote_service_origin: "https://data.carelink.example".to_string(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_service_detection_is_prefix_based() {
        let cfg = OfflineConfig::default();

        assert!(cfg.is_remote_service("https://data.carelink.example/rest/v1/appointments"));
        assert!(!cfg.is_remote_service("/assets/app.js"));
        assert!(!cfg.is_remote_service("https://cdn.example.com/font.woff2"));
    }

    #[test]
    fn test_default_manifest_contains_fallback_and_placeholder() {
        let cfg = OfflineConfig::default();

        assert!(cfg.shell_manifest.contains(&cfg.offline_fallback_url));
        assert!(cfg.shell_manifest.contains(&cfg.placeholder_image_url));
    }
}
