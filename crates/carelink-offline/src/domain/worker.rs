//! Host lifecycle event vocabulary.
//!
//! The background worker is activated only by events dispatched by the host
//! environment; it has no main loop of its own. Each variant carries the
//! fixed contract the host honours:
//!
//! - `Install` must resolve only after the shell manifest is fully cached.
//! - `Activate` must resolve only after stale cache generations are purged.
//! - `Fetch` must always produce a response for a same-origin request.
//! - `Sync` identifies the replay batch by tag (e.g. `sync-appointments`).

use serde::{Deserialize, Serialize};

use crate::domain::assets::AssetRequest;

/// Payload of a push event: `{title, message, url}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushNotification {
    pub title: String,
    pub message: String,
    #[serde(default = "default_url")]
    pub url: String,
}

fn default_url() -> String {
    "/".to_string()
}

/// A lifecycle event dispatched by the host environment.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(AssetRequest),
    Sync { tag: String },
    Push(PushNotification),
    NotificationClick { url: String },
}

// ── Tests ─────────────────────────────────────────────────────────────────────
