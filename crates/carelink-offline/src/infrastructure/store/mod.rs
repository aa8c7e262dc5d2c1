//! Persistent key-value store backing the pending-write queue.
//!
//! One store, versioned, with one named partition per action kind. The
//! on-disk layout is deliberately simple: `<root>/v<version>/<partition>.json`,
//! each file holding a JSON object keyed by entry id. Entries are only ever
//! appended, overwritten whole, or deleted -- no in-place mutation -- so the
//! file-per-partition granularity needs no locking beyond the filesystem's
//! own atomicity for whole-file writes.
//!
//! Store failures (directory not creatable, file unreadable) propagate to the
//! caller; there is no fallback storage.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing store at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A partition file could not be parsed or an entry could not be encoded.
    #[error("failed to encode/decode store data: {0}")]
    Serde(#[from] serde_json::Error),

    /// The named partition was not declared when the store was opened.
    #[error("unknown partition: {0}")]
    UnknownPartition(String),

    /// The platform data directory could not be determined.
    #[error("could not determine platform data directory")]
    NoPlatformDataDir,
}

/// The persistent partitioned store.
pub struct KvStore {
    dir: PathBuf,
    partitions: Vec<String>,
}

impl KvStore {
    /// Opens (creating if necessary) version `version` of the store under
    /// `root`, with the given named partitions.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the store directory cannot be created
    /// -- e.g. storage unavailable or denied. A failed open is surfaced to
    /// the caller as-is; nothing is retried.
    pub fn open(
        root: &Path,
        version: u32,
        partitions: &[&str],
    ) -> Result<Self, StorageError> {
        let dir = root.join(format!("v{version}"));
        std::fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            partitions: partitions.iter().map(|p| p.to_string()).collect(),
        })
    }

    /// Writes `value` keyed by `id` into the partition, overwriting any
    /// existing entry with the same id (last write wins).
    pub fn put(
        &self,
        partition: &str,
        id: &str,
        value: serde_json::Value,
    ) -> Result<(), StorageError> {
        let mut entries = self.load(partition)?;
        entries.insert(id.to_string(), value);
        self.persist(partition, &entries)
    }

    /// Reads the entry keyed by `id`, if present.
    pub fn get(&self, partition: &str, id: &str) -> Result<Option<serde_json::Value>, StorageError> {
        Ok(self.load(partition)?.remove(id))
    }

    /// Deletes the entry keyed by `id`. Returns whether it existed.
    pub fn delete(&self, partition: &str, id: &str) -> Result<bool, StorageError> {
        let mut entries = self.load(partition)?;
        let existed = entries.remove(id).is_some();
        if existed {
            self.persist(partition, &entries)?;
        }
        Ok(existed)
    }

    /// Returns every entry in the partition. No ordering is guaranteed.
    pub fn get_all(&self, partition: &str) -> Result<Vec<serde_json::Value>, StorageError> {
        Ok(self.load(partition)?.into_values().collect())
    }

    /// Number of entries currently in the partition.
    pub fn len(&self, partition: &str) -> Result<usize, StorageError> {
        Ok(self.load(partition)?.len())
    }

    pub fn is_empty(&self, partition: &str) -> Result<bool, StorageError> {
        Ok(self.len(partition)? == 0)
    }

    fn partition_path(&self, partition: &str) -> Result<PathBuf, StorageError> {
        if !self.partitions.iter().any(|p| p == partition) {
            return Err(StorageError::UnknownPartition(partition.to_string()));
        }
        Ok(self.dir.join(format!("{partition}.json")))
    }

    fn load(&self, partition: &str) -> Result<BTreeMap<String, serde_json::Value>, StorageError> {
        let path = self.partition_path(partition)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn persist(
        &self,
        partition: &str,
        entries: &BTreeMap<String, serde_json::Value>,
    ) -> Result<(), StorageError> {
        let path = self.partition_path(partition)?;
        let content = serde_json::to_string_pretty(entries)?;
        std::fs::write(&path, content).map_err(|source| StorageError::Io { path, source })
    }
}

/// Resolves the platform-appropriate base directory for the store.
pub fn platform_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("CareLink"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local").join("share"))
            })?;
        Some(base.join("carelink"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("CareLink")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
