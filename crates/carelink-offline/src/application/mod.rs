//! Application services of the offline layer.
//!
//! - **`sync_queue`** – the persistent pending-write queue and its
//!   at-least-once replay into the remote data service.
//! - **`shell_cache`** – install/activate of the shell asset cache and the
//!   fetch strategies (network-first navigations, cache-first sub-resources).
//! - **`worker`** – dispatch of host lifecycle events onto the two services.

pub mod shell_cache;
pub mod sync_queue;
pub mod worker;
