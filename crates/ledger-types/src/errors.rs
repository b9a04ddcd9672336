//! # Error Types
//!
//! Structural failures only. Domain findings (hash mismatch, chain break,
//! missing live source, survey not on ledger during verification) are always
//! returned as verdict data, never raised through these types.

use thiserror::Error;

/// A record could not be reduced to its canonical hashable form.
///
/// Fatal to the write that produced it; the hasher never substitutes a
/// default value for an uncanonicalizable record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanonicalizationError {
    /// Nesting exceeded the configured depth bound.
    #[error("record nesting exceeds {max} levels")]
    TooDeep { max: usize },

    /// The canonical form could not be rendered as JSON text.
    #[error("record cannot be rendered as canonical JSON: {0}")]
    Serialize(String),
}

/// Failures of a key-value store adapter.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The operation exceeded its bounded wait. Retryable.
    #[error("store operation timed out after {waited_ms} ms")]
    Timeout { waited_ms: u64 },

    /// Underlying I/O failure.
    #[error("store I/O failure: {0}")]
    Io(String),

    /// Persisted bytes could not be decoded.
    #[error("store data corrupt: {0}")]
    Corrupt(String),
}

/// Failure of a live-data collaborator.
///
/// A *missing record* is not an error (the fetch returns `None` and the
/// verifier reports `source_missing`); this covers the collaborator itself
/// being unreachable.
#[derive(Debug, Clone, Error)]
#[error("collaborator for {section} is unavailable: {message}")]
pub struct SourceError {
    pub section: String,
    pub message: String,
}

/// Top-level error of every ledger operation.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Input record could not be canonicalized for hashing.
    #[error(transparent)]
    Canonicalization(#[from] CanonicalizationError),

    /// The survey has no block; callers must register it first.
    #[error("survey {survey_number} is not on the ledger")]
    NotFound { survey_number: String },

    /// A block already exists for this survey; callers must update instead.
    #[error("survey {survey_number} is already on the ledger")]
    AlreadyRegistered { survey_number: String },

    /// A store call or lock acquisition exceeded its bounded wait.
    /// Retryable with backoff.
    #[error("store operation timed out after {waited_ms} ms (retryable)")]
    StoreTimeout { waited_ms: u64 },

    /// Non-timeout store failure.
    #[error("store failure: {0}")]
    Store(String),

    /// A live-data collaborator was unreachable.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The caller aborted the operation; partial results were discarded.
    #[error("operation cancelled by caller")]
    Cancelled,
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Timeout { waited_ms } => LedgerError::StoreTimeout { waited_ms },
            other => LedgerError::Store(other.to_string()),
        }
    }
}
