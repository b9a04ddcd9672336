//! # In-Memory Key-Value Store

use crate::ports::outbound::{BatchOperation, KeyValueStore};
use ledger_types::StoreError;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::time::Duration;

/// In-memory key-value store.
///
/// A `BTreeMap` behind a `RwLock`: readers run concurrently, a batch write
/// holds the write lock for its whole batch so a reader never observes a
/// half-applied write. Lock waits are bounded and surface as
/// `StoreError::Timeout`.
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
    op_timeout: Duration,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(5))
    }

    /// Store with a custom bounded wait for lock acquisition.
    pub fn with_timeout(op_timeout: Duration) -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            op_timeout,
        }
    }

    fn timeout(&self) -> StoreError {
        StoreError::Timeout {
            waited_ms: self.op_timeout.as_millis() as u64,
        }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryStore {
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
        Ok(())
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
        // BTreeMap range scan: ascending key order by construction.
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
        Ok(())
    }
}
