//! Domain types for the offline layer.
//!
//! - **`entry`** – pending writes and their store partitions.
//! - **`assets`** – requests/responses flowing through the shell asset cache.
//! - **`config`** – runtime configuration for the whole layer.
//! - **`worker`** – the host lifecycle event vocabulary.

pub mod assets;
pub mod config;
pub mod entry;
pub mod worker;
