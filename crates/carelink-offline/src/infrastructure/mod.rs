//! Infrastructure for the offline layer.
//!
//! - **`store`** – the persistent, versioned, partitioned key-value store.
//! - **`cache`** – named asset-cache generations on disk.
//! - **`remote`** – the remote data service boundary (trait + mock).
//! - **`fetch`** – live network fetches for shell assets (trait + mock).
//! - **`notify`** – notification presentation (trait + mock).

pub mod cache;
pub mod fetch;
pub mod notify;
pub mod remote;
pub mod store;
