//! # Outbound Ports (Driven Ports)
//!
//! Dependencies the host application provides to the ledger engine. All
//! ports are `&self` + `Send + Sync` so reads can run concurrently; write
//! serialization is the service's job, not the adapters'.

use chrono::{DateTime, Utc};
use ledger_types::{OfficerContext, SectionKind, SourceError, StoreError};
use serde_json::Value;

/// Abstract key-value persistence for blocks and timeline events.
///
/// Keys are ASCII strings built by [`crate::domain::keys`]. The store is
/// append-mostly and deliberately has no delete operation: blocks and events
/// are never removed, corrections append.
///
/// ## Bounded waits
///
/// Every operation must return within the adapter's configured wait, with
/// `StoreError::Timeout` on expiry. Callers treat that as retryable.
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Put a single key-value pair (upsert).
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Check whether a key exists.
    fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// All pairs whose key starts with `prefix`, in ascending key order.
    fn prefix_scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StoreError>;

    /// Execute an atomic batch of puts: either all land or none do. A reader
    /// never observes a partially applied batch.
    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), StoreError>;
}

/// One operation of an atomic batch.
#[derive(Debug, Clone)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put { key: String, value: Vec<u8> },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Live-data gateway to the owning subsystems (JMR store, notice store,
/// payment store, award store, landowner store).
///
/// Returns the *current* record for a section — the thing verification
/// compares against the hashes recorded at write time.
pub trait SectionSource: Send + Sync {
    /// The live snapshot for one section of one survey. `Ok(None)` means the
    /// record does not exist (deleted or never created); `Err` means the
    /// collaborator itself was unreachable.
    fn fetch(
        &self,
        survey_number: &str,
        section: SectionKind,
    ) -> Result<Option<Value>, SourceError>;

    /// Every survey number known to any collaborator. Drives the
    /// sync-from-live aggregation.
    fn survey_numbers(&self) -> Result<Vec<String>, SourceError>;
}

/// Identity of the officer on whose behalf a write runs, for requests that
/// do not carry one explicitly.
pub trait OfficerContextSource: Send + Sync {
    fn current(&self) -> OfficerContext;
}

/// Abstract clock (for testability).
pub trait TimeSource: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

// Shared-ownership wiring: an `Arc` to a port is itself that port, so a host
// can keep a handle to an adapter it hands to the service.

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        (**self).put(key, value)
    }
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        (**self).exists(key)
    }
    fn prefix_scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        (**self).prefix_scan(prefix)
    }
    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), StoreError> {
        (**self).atomic_batch_write(operations)
    }
}

impl<T: SectionSource + ?Sized> SectionSource for std::sync::Arc<T> {
    fn fetch(
        &self,
        survey_number: &str,
        section: SectionKind,
    ) -> Result<Option<Value>, SourceError> {
        (**self).fetch(survey_number, section)
    }
    fn survey_numbers(&self) -> Result<Vec<String>, SourceError> {
        (**self).survey_numbers()
    }
}

impl<T: OfficerContextSource + ?Sized> OfficerContextSource for std::sync::Arc<T> {
    fn current(&self) -> OfficerContext {
        (**self).current()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for std::sync::Arc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
