//! # Timeline Types
//!
//! The timeline is the per-survey, append-only audit trail: one event per
//! state-changing action, each carrying its own payload digest and a back
//! reference to the previous event's digest. The chain is independent of the
//! block revisions but keyed to the same survey.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One chronological, hash-linked audit entry for a survey.
///
/// Invariant: for every event after the first, `previous_hash` equals the
/// predecessor's `data_hash`; the first event links to the genesis constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Zero-based position within the survey's timeline.
    pub sequence: u64,
    /// Free-form event name (e.g. `JMR_MEASUREMENT_UPLOADED`).
    pub action: String,
    /// When the event was appended.
    pub timestamp: DateTime<Utc>,
    /// Officer who performed the action.
    pub officer_id: String,
    /// Digest over the event's canonicalized payload
    /// (`action`, `officer_id`, `remarks`, `metadata`).
    pub data_hash: String,
    /// `data_hash` of the previous event, or the genesis constant.
    pub previous_hash: String,
    /// Event-specific structured payload.
    pub metadata: Value,
    /// Free-form note supplied by the writer.
    pub remarks: Option<String>,
}
