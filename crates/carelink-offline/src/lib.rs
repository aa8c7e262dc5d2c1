//! # carelink-offline
//!
//! Offline durability layer for the CareLink portal.
//!
//! Two guarantees live here:
//!
//! 1. **Writes are not silently lost.** A user action (appointment
//!    submission, chat message) that cannot reach the remote data service is
//!    parked in a persistent pending-write queue and replayed — entry by
//!    entry, at-least-once — when connectivity returns.
//! 2. **The installed app shell stays usable offline.** A versioned asset
//!    cache serves the shell (navigations network-first with an offline
//!    fallback page, sub-resources cache-first with an image placeholder),
//!    while requests to the remote data service are never intercepted — their
//!    natural failure is exactly what feeds the pending-write queue.
//!
//! The layer runs in a background worker context and is driven entirely by
//! host lifecycle events (`install`, `activate`, `fetch`, `sync`, `push`,
//! `notificationclick`), dispatched through [`OfflineWorker`].

pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export the most-used types at the crate root.
pub use application::shell_cache::{ShellCache, ShellCacheError};
pub use application::sync_queue::{PendingWriteQueue, ReplayReport};
pub use application::worker::{OfflineWorker, WorkerError};
pub use domain::assets::{
    AssetRequest, FetchedResponse, RequestDestination, RequestMode, ResponseOrigin,
    ServedResponse, ServedVia,
};
pub use domain::config::OfflineConfig;
pub use domain::entry::{PendingWrite, WriteKind};
pub use domain::worker::{PushNotification, WorkerEvent};
pub use infrastructure::store::{KvStore, StorageError};
