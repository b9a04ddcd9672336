//! # File-Backed Key-Value Store
//!
//! Persists the ledger as one JSON snapshot. Writes land via a temp file and
//! an atomic rename, so a crash mid-save leaves the previous snapshot
//! intact. An advisory flock on a sidecar file keeps a second process from
//! opening the same ledger.

use crate::ports::outbound::{BatchOperation, KeyValueStore};
use fs2::FileExt;
use ledger_types::StoreError;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File-backed key-value store for single-process durable deployments.
pub struct FileStore {
    path: PathBuf,
    /// Held open for the adapter's lifetime to keep the flock.
    _lock_file: File,
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
    op_timeout: Duration,
}

impl FileStore {
    /// Open (or create) the store at `path`.
    ///
    /// ## Errors
    ///
    /// - `Io`: the directory cannot be created, the lock is held by another
    ///   process, or the snapshot cannot be read
    /// - `Corrupt`: the snapshot exists but does not decode
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::open_with_timeout(path, Duration::from_secs(5))
    }

    /// Open with a custom bounded wait for lock acquisition.
    pub fn open_with_timeout<P: AsRef<Path>>(
        path: P,
        op_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
        }

        let lock_path = path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| StoreError::Io(e.to_string()))?;
        lock_file.try_lock_exclusive().map_err(|_| {
            StoreError::Io(format!("ledger file already in use: {}", path.display()))
        })?;

        let entries = Self::load(&path)?;
        if entries.is_empty() {
            tracing::info!("[ledger] 💾 new ledger file at {}", path.display());
        } else {
            tracing::info!(
                "[ledger] 💾 loaded {} keys from {}",
                entries.len(),
                path.display()
            );
        }

        Ok(Self {
            path,
            _lock_file: lock_file,
            entries: RwLock::new(entries),
            op_timeout,
        })
    }

    fn load(path: &Path) -> Result<BTreeMap<String, Vec<u8>>, StoreError> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let bytes = fs::read(path).map_err(|e| StoreError::Io(e.to_string()))?;
        if bytes.is_empty() {
            return Ok(BTreeMap::new());
        }
        // Values are JSON text themselves, so the snapshot is a string map.
        let decoded: BTreeMap<String, String> = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Corrupt(format!("{}: {e}", path.display())))?;
        Ok(decoded
            .into_iter()
            .map(|(k, v)| (k, v.into_bytes()))
            .collect())
    }

    fn save(&self, entries: &BTreeMap<String, Vec<u8>>) -> Result<(), StoreError> {
        let snapshot: BTreeMap<&String, &str> = entries
            .iter()
            .map(|(k, v)| {
                std::str::from_utf8(v)
                    .map(|s| (k, s))
                    .map_err(|e| StoreError::Corrupt(format!("non-UTF-8 value at {k}: {e}")))
            })
            .collect::<Result<_, _>>()?;
        let bytes =
            serde_json::to_vec(&snapshot).map_err(|e| StoreError::Io(e.to_string()))?;

        // Atomic replace: write sidecar, fsync, rename over the snapshot.
        let temp_path = self.path.with_extension("tmp");
        let mut file = File::create(&temp_path).map_err(|e| StoreError::Io(e.to_string()))?;
        file.write_all(&bytes).map_err(|e| StoreError::Io(e.to_string()))?;
        file.sync_all().map_err(|e| StoreError::Io(e.to_string()))?;
        fs::rename(&temp_path, &self.path).map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(())
    }

    fn timeout(&self) -> StoreError {
        StoreError::Timeout {
            waited_ms: self.op_timeout.as_millis() as u64,
        }
    }

    /// Path of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let entries = self
            .entries
            .try_read_for(self.op_timeout)
            .ok_or_else(|| self.timeout())?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .try_write_for(self.op_timeout)
            .ok_or_else(|| self.timeout())?;
        entries.insert(key.to_string(), value.to_vec());
        self.save(&entries)
    }

    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let entries = self
            .entries
            .try_read_for(self.op_timeout)
            .ok_or_else(|| self.timeout())?;
        Ok(entries.contains_key(key))
    }

    fn prefix_scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        let entries = self
            .entries
            .try_read_for(self.op_timeout)
            .ok_or_else(|| self.timeout())?;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .try_write_for(self.op_timeout)
            .ok_or_else(|| self.timeout())?;
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    entries.insert(key, value);
                }
            }
        }
        self.save(&entries)
    }
}
