//! # Engine Configuration

use std::time::Duration;

/// Configuration for the ledger engine.
///
/// All values have production defaults; tests tighten the timeouts.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Bounded wait for a single store operation before it surfaces as a
    /// retryable timeout (default: 5s).
    pub store_timeout: Duration,

    /// Bounded wait for the per-survey write lock (default: 5s).
    pub lock_timeout: Duration,

    /// Canonicalization nesting bound (default: 128 levels).
    pub max_canonical_depth: usize,

    /// Run bulk verification sweeps across worker threads (default: true).
    pub parallel_sweep: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(5),
            lock_timeout: Duration::from_secs(5),
            max_canonical_depth: 128,
            parallel_sweep: true,
        }
    }
}

impl LedgerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bounded wait for store operations.
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    /// Set the bounded wait for the per-survey write lock.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Set the canonicalization depth bound.
    pub fn with_max_canonical_depth(mut self, depth: usize) -> Self {
        self.max_canonical_depth = depth;
        self
    }

    /// Enable or disable the parallel bulk sweep.
    pub fn with_parallel_sweep(mut self, parallel: bool) -> Self {
        self.parallel_sweep = parallel;
        self
    }
}
