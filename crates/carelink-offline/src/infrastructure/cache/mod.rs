//! Versioned asset cache persisted as per-generation snapshots.
//!
//! Each cache generation (e.g. `carelink-shell-v1`) is one bincode snapshot
//! file under the cache directory. A new shell release ships with a new
//! generation name; activation deletes every snapshot whose name differs,
//! so at most one generation survives an upgrade.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One cached response body with its status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedAsset {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Error type for cache persistence.
#[derive(Debug, Error)]
pub enum CacheError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing cache at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A snapshot could not be encoded or decoded.
    #[error("cache snapshot codec error: {0}")]
    Snapshot(#[from] bincode::Error),
}

/// On-disk cache storage, one snapshot file per generation.
pub struct CacheStorage {
    dir: PathBuf,
}

impl CacheStorage {
    /// Opens (creating if necessary) cache storage rooted at `dir`.
    pub fn open(dir: &Path) -> Result<Self, CacheError> {
        std::fs::create_dir_all(dir).map_err(|source| CacheError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Inserts one asset into the generation, creating the snapshot if this
    /// is the generation's first entry.
    pub fn put(&self, generation: &str, url: &str, asset: CachedAsset) -> Result<(), CacheError> {
        let mut snapshot = self.load(generation)?;
        snapshot.insert(url.to_string(), asset);
        self.persist(generation, &snapshot)
    }

    /// Inserts a batch of assets into the generation in one snapshot write.
    pub fn put_all(
        &self,
        generation: &str,
        assets: impl IntoIterator<Item = (String, CachedAsset)>,
    ) -> Result<(), CacheError> {
        let mut snapshot = self.load(generation)?;
        snapshot.extend(assets);
        self.persist(generation, &snapshot)
    }

    /// Looks up a cached asset by URL.
    pub fn get(&self, generation: &str, url: &str) -> Result<Option<CachedAsset>, CacheError> {
        Ok(self.load(generation)?.remove(url))
    }

    /// Number of assets in the generation.
    pub fn len(&self, generation: &str) -> Result<usize, CacheError> {
        Ok(self.load(generation)?.len())
    }

    pub fn is_empty(&self, generation: &str) -> Result<bool, CacheError> {
        Ok(self.len(generation)? == 0)
    }

    /// Names of every generation currently on disk.
    pub fn list_generations(&self) -> Result<Vec<String>, CacheError> {
        let entries = std::fs::read_dir(&self.dir).map_err(|source| CacheError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let mut generations = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| CacheError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if let Some(generation) = name.strip_suffix(".cache") {
                generations.push(generation.to_string());
            }
        }
        generations.sort();
        Ok(generations)
    }

    /// Deletes a generation's snapshot. Missing snapshots are ignored.
    pub fn delete_generation(&self, generation: &str) -> Result<(), CacheError> {
        let path = self.snapshot_path(generation);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CacheError::Io { path, source }),
        }
    }

    fn snapshot_path(&self, generation: &str) -> PathBuf {
        self.dir.join(format!("{generation}.cache"))
    }

    fn load(&self, generation: &str) -> Result<HashMap<String, CachedAsset>, CacheError> {
        let path = self.snapshot_path(generation);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bincode::deserialize(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(source) => Err(CacheError::Io { path, source }),
        }
    }

    fn persist(
        &self,
        generation: &str,
        snapshot: &HashMap<String, CachedAsset>,
    ) -> Result<(), CacheError> {
        let path = self.snapshot_path(generation);
        let bytes = bincode::serialize(snapshot)?;
        std::fs::write(&path, bytes).map_err(|source| CacheError::Io { path, source })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_cache() -> (CacheStorage, PathBuf) {
        let dir = std::env::temp_dir().join(format!("carelink_cache_{}", Uuid::new_v4()));
        let storage = CacheStorage::open(&dir).expect("open cache");
        (storage, dir)
    }

    fn asset(body: &[u8]) -> CachedAsset {
        CachedAsset {
            status: 200,
            body: body.to_vec(),
        }
    }

    #[test]
    fn test_put_then_get_returns_the_asset() {
        let (storage, dir) = temp_cache();

        storage.put("shell-v1", "/index.html", asset(b"<html>")).unwrap();
        let cached = storage.get("shell-v1", "/index.html").unwrap();

        assert_eq!(cached, Some(asset(b"<html>")));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_generations_are_isolated_from_each_other() {
        let (storage, dir) = temp_cache();
        storage.put("shell-v1", "/app.js", asset(b"v1")).unwrap();

        let in_v2 = storage.get("shell-v2", "/app.js").unwrap();

        assert_eq!(in_v2, None);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_list_generations_reports_every_snapshot() {
        let (storage, dir) = temp_cache();
        storage.put("shell-v1", "/", asset(b"a")).unwrap();
        storage.put("shell-v2", "/", asset(b"b")).unwrap();

        let generations = storage.list_generations().unwrap();

        assert_eq!(generations, vec!["shell-v1", "shell-v2"]);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_delete_generation_removes_it_and_tolerates_missing_snapshots() {
        let (storage, dir) = temp_cache();
        storage.put("shell-v1", "/", asset(b"a")).unwrap();

        storage.delete_generation("shell-v1").unwrap();
        storage.delete_generation("shell-v1").unwrap();

        assert!(storage.list_generations().unwrap().is_empty());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_put_all_writes_the_batch_in_one_pass() {
        let (storage, dir) = temp_cache();

        storage
            .put_all(
                "shell-v1",
                vec![
                    ("/".to_string(), asset(b"index")),
                    ("/app.js".to_string(), asset(b"js")),
                ],
            )
            .unwrap();

        assert_eq!(storage.len("shell-v1").unwrap(), 2);
        std::fs::remove_dir_all(&dir).ok();
    }
}
