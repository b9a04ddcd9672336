//! # Timeline Rules
//!
//! Construction and verification of the per-survey audit chain. Each event
//! hashes its own payload and links to its predecessor's `data_hash`, so
//! both an out-of-band edit and a re-ordering show up as a broken link.

use crate::domain::hashing::event_digest;
use chrono::{DateTime, Utc};
use ledger_types::{CanonicalizationError, ChainVerdict, TimelineEvent, GENESIS_HASH};
use serde_json::Value;

/// Build the next timeline event for a survey.
///
/// `previous_hash` must be the predecessor's `data_hash`, or the genesis
/// constant for the first event.
#[allow(clippy::too_many_arguments)]
pub fn build_event(
    sequence: u64,
    action: &str,
    officer_id: &str,
    remarks: Option<String>,
    metadata: Value,
    previous_hash: String,
    max_depth: usize,
    now: DateTime<Utc>,
) -> Result<TimelineEvent, CanonicalizationError> {
    let data_hash = event_digest(action, officer_id, remarks.as_deref(), &metadata, max_depth)?;
    Ok(TimelineEvent {
        sequence,
        action: action.to_string(),
        timestamp: now,
        officer_id: officer_id.to_string(),
        data_hash,
        previous_hash,
        metadata,
        remarks,
    })
}

/// Walk a survey's timeline and report the first broken link, if any.
///
/// Two checks per event: the back reference must match the predecessor's
/// `data_hash` (genesis constant for the first event), and the stored
/// `data_hash` must re-derive from the event's own payload.
pub fn verify_timeline(events: &[TimelineEvent], max_depth: usize) -> ChainVerdict {
    let length = events.len() as u64;

    for (i, event) in events.iter().enumerate() {
        let expected_prev = if i == 0 {
            GENESIS_HASH
        } else {
            events[i - 1].data_hash.as_str()
        };
        if event.previous_hash != expected_prev {
            return ChainVerdict::broken(
                length,
                i as u64,
                format!(
                    "event {} previous_hash does not match its predecessor's data_hash",
                    event.sequence
                ),
            );
        }

        let rederived = match event_digest(
            &event.action,
            &event.officer_id,
            event.remarks.as_deref(),
            &event.metadata,
            max_depth,
        ) {
            Ok(hash) => hash,
            Err(e) => {
                return ChainVerdict::broken(
                    length,
                    i as u64,
                    format!("event {} payload is not canonicalizable: {e}", event.sequence),
                )
            }
        };
        if rederived != event.data_hash {
            return ChainVerdict::broken(
                length,
                i as u64,
                format!(
                    "event {} data_hash does not re-derive from its payload",
                    event.sequence
                ),
            );
        }
    }

    ChainVerdict::intact(length)
}
