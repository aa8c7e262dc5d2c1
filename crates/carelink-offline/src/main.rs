//! Sync worker entry point.
//!
//! Headless process that opens the offline store in the platform data
//! directory and periodically reports the pending-write backlog until
//! interrupted. Install/activate/fetch/sync/push events are dispatched by
//! the host embedding [`carelink_offline::OfflineWorker`]; this binary only
//! gives operators a standalone view of the queue.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use carelink_offline::domain::entry::{CACHED_USER_DATA_PARTITION, WriteKind};
use carelink_offline::infrastructure::store::{platform_data_dir, KvStore, StorageError};
use carelink_offline::OfflineConfig;

const REPORT_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("CareLink sync worker starting");

    let config = OfflineConfig::default();
    let root = platform_data_dir()
        .ok_or(StorageError::NoPlatformDataDir)?
        .join(&config.store_root);
    let store = Arc::new(KvStore::open(
        &root,
        config.store_version,
        &[
            WriteKind::Appointment.partition(),
            WriteKind::Message.partition(),
            CACHED_USER_DATA_PARTITION,
        ],
    )?);
    info!(store = %root.display(), version = config.store_version, "offline store opened");

    let reporter = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(REPORT_INTERVAL);
            loop {
                ticker.tick().await;
                for kind in [WriteKind::Appointment, WriteKind::Message] {
                    match store.len(kind.partition()) {
                        Ok(0) => {}
                        Ok(n) => info!(kind = ?kind, pending = n, "writes awaiting sync"),
                        Err(e) => warn!(kind = ?kind, error = %e, "could not read backlog"),
                    }
                }
            }
        })
    };

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested, stopping sync worker");
    reporter.abort();

    Ok(())
}
