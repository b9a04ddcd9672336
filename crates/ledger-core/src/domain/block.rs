//! # Block Assembly
//!
//! Pure construction of block revisions. The service supplies everything
//! non-deterministic (id, nonce, clock); assembly itself is a function of its
//! inputs, so the linking and digest rules are testable without a store.

use crate::domain::hashing::{block_header_digest, digest_with_depth};
use chrono::{DateTime, Utc};
use ledger_types::{
    Block, CanonicalizationError, EventType, OfficerContext, SectionSet, SectionSnapshot,
    SectionStatus, GENESIS_HASH,
};
use serde_json::Value;

/// Assemble the next revision of a survey's chain.
///
/// Revision 0 links to the genesis constant; every later revision carries the
/// previous revision's `current_hash` forward into `previous_hash` and keeps
/// the original `created_at`. The `current_hash` is computed last, over the
/// fully assembled header.
#[allow(clippy::too_many_arguments)]
pub fn assemble_revision(
    prev: Option<&Block>,
    survey_number: &str,
    event_type: EventType,
    sections: SectionSet,
    ctx: &OfficerContext,
    remarks: Option<String>,
    block_id: String,
    nonce: u64,
    now: DateTime<Utc>,
) -> Result<Block, CanonicalizationError> {
    let (previous_hash, revision, created_at) = match prev {
        Some(p) => (p.current_hash.clone(), p.revision + 1, p.created_at),
        None => (GENESIS_HASH.to_string(), 0, now),
    };

    let mut block = Block {
        block_id,
        survey_number: survey_number.to_string(),
        event_type,
        officer_id: ctx.officer_id.clone(),
        project_id: ctx.project_id.clone(),
        sections,
        previous_hash,
        current_hash: String::new(),
        nonce,
        is_valid: true,
        remarks,
        revision,
        created_at,
        updated_at: now,
    };
    block.current_hash = block_header_digest(&block)?;
    Ok(block)
}

/// Produce the snapshot for a section being written.
///
/// A first write is `created`, any later write is `updated` — including a
/// write with byte-identical data, which still bumps `last_updated`
/// (an event is evidence-of-check, not evidence-of-change).
pub fn record_section(
    prev: &SectionSnapshot,
    data: Value,
    max_depth: usize,
    now: DateTime<Utc>,
) -> Result<SectionSnapshot, CanonicalizationError> {
    let hash = digest_with_depth(&data, max_depth)?;
    let status = if prev.has_data() {
        SectionStatus::Updated
    } else {
        SectionStatus::Created
    };
    Ok(SectionSnapshot::recorded(data, hash, now, status))
}
