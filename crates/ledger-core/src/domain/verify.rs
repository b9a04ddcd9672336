//! # Verification Policy
//!
//! Pure verdict assembly: compare a stored section against its rehydrated
//! live record, walk the block revision chain, and fold the pieces into one
//! overall verdict. All I/O (loading revisions, fetching live data) happens
//! in the service layer; this module only judges what it is handed.

use crate::domain::hashing::{block_header_digest, digest_with_depth};
use chrono::{DateTime, Utc};
use ledger_types::{
    Block, CanonicalizationError, ChainVerdict, ComparisonSource, IntegrityVerdict,
    SectionKind, SectionSnapshot, SectionVerdict, VerdictStatus, GENESIS_HASH,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// Judge one section: stored snapshot vs. the current live record.
///
/// - never created -> vacuously valid, excluded from the mismatch count
/// - stored hash but no live record -> invalid, `source_missing` (distinct
///   from a mismatch so the UI can render "deleted" vs "tampered")
/// - live record but no stored hash -> vacuously valid, `live_only`
/// - both present -> recompute and compare
pub fn section_verdict(
    stored: &SectionSnapshot,
    live: Option<&Value>,
    max_depth: usize,
) -> Result<SectionVerdict, CanonicalizationError> {
    if !stored.has_data() {
        return Ok(SectionVerdict::not_created());
    }

    let Some(stored_hash) = stored.hash.clone() else {
        let current_hash = live.map(|v| digest_with_depth(v, max_depth)).transpose()?;
        return Ok(SectionVerdict {
            is_valid: true,
            stored_hash: None,
            current_hash,
            comparison_source: ComparisonSource::LiveOnly,
            last_updated: stored.last_updated,
        });
    };

    match live {
        None => Ok(SectionVerdict {
            is_valid: false,
            stored_hash: Some(stored_hash),
            current_hash: None,
            comparison_source: ComparisonSource::SourceMissing,
            last_updated: stored.last_updated,
        }),
        Some(record) => {
            let current_hash = digest_with_depth(record, max_depth)?;
            Ok(SectionVerdict {
                is_valid: stored_hash == current_hash,
                stored_hash: Some(stored_hash),
                current_hash: Some(current_hash),
                comparison_source: ComparisonSource::LiveDb,
                last_updated: stored.last_updated,
            })
        }
    }
}

/// Walk a survey's block revisions (ascending) and report the first broken
/// link. Each revision must link to its predecessor's `current_hash`
/// (genesis constant for revision 0) and its own `current_hash` must
/// re-derive from its persisted header.
pub fn verify_revision_chain(revisions: &[Block]) -> ChainVerdict {
    let length = revisions.len() as u64;

    for (i, block) in revisions.iter().enumerate() {
        let expected_prev = if i == 0 {
            GENESIS_HASH
        } else {
            revisions[i - 1].current_hash.as_str()
        };
        if block.previous_hash != expected_prev {
            return ChainVerdict::broken(
                length,
                i as u64,
                format!(
                    "revision {} previous_hash does not match its predecessor",
                    block.revision
                ),
            );
        }

        let rederived = match block_header_digest(block) {
            Ok(hash) => hash,
            Err(e) => {
                return ChainVerdict::broken(
                    length,
                    i as u64,
                    format!("revision {} header is not canonicalizable: {e}", block.revision),
                )
            }
        };
        if rederived != block.current_hash {
            return ChainVerdict::broken(
                length,
                i as u64,
                format!(
                    "revision {} current_hash does not re-derive from its header",
                    block.revision
                ),
            );
        }
    }

    ChainVerdict::intact(length)
}

/// Fold section verdicts, chain walks, and the aggregate digest comparison
/// into the overall verdict for one survey.
pub fn assemble_verdict(
    block: &Block,
    sections: BTreeMap<SectionKind, SectionVerdict>,
    block_chain: ChainVerdict,
    timeline: ChainVerdict,
    recomputed_block_hash: String,
    now: DateTime<Utc>,
) -> IntegrityVerdict {
    let block_hash_match = recomputed_block_hash == block.current_hash;

    let mismatched: Vec<&str> = sections
        .iter()
        .filter(|(_, v)| !v.is_valid && v.comparison_source == ComparisonSource::LiveDb)
        .map(|(k, _)| k.as_str())
        .collect();
    let missing: Vec<&str> = sections
        .iter()
        .filter(|(_, v)| v.comparison_source == ComparisonSource::SourceMissing)
        .map(|(k, _)| k.as_str())
        .collect();

    let mut failures: Vec<String> = Vec::new();
    if !mismatched.is_empty() {
        failures.push(format!("section hash mismatch: {}", mismatched.join(", ")));
    }
    if !missing.is_empty() {
        failures.push(format!("live source missing: {}", missing.join(", ")));
    }
    if let (false, Some(at)) = (block_chain.is_valid, block_chain.broken_at) {
        failures.push(format!("block revision chain broken at revision {at}"));
    }
    if let (false, Some(at)) = (timeline.is_valid, timeline.broken_at) {
        failures.push(format!("timeline chain broken at event {at}"));
    }
    // Only worth naming separately when no section drifted: it then points
    // at the block header itself.
    if !block_hash_match && mismatched.is_empty() && missing.is_empty() {
        failures.push("block aggregate hash mismatch".to_string());
    }

    let is_valid = failures.is_empty();
    IntegrityVerdict {
        survey_number: block.survey_number.clone(),
        status: if is_valid {
            VerdictStatus::Verified
        } else {
            VerdictStatus::Compromised
        },
        is_valid,
        reason: if is_valid {
            "all integrity checks passed".to_string()
        } else {
            failures.join("; ")
        },
        sections,
        block_chain: Some(block_chain),
        timeline: Some(timeline),
        stored_block_hash: Some(block.current_hash.clone()),
        recomputed_block_hash: Some(recomputed_block_hash),
        block_hash_match: Some(block_hash_match),
        verified_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::block::{assemble_revision, record_section};
    use crate::domain::canonical::DEFAULT_MAX_DEPTH;
    use crate::domain::hashing::digest;
    use ledger_types::{EventType, OfficerContext, SectionSet, SectionStatus};
    use serde_json::json;

    fn stored(data: Value) -> SectionSnapshot {
        let hash = digest(&data).unwrap();
        SectionSnapshot::recorded(data, hash, Utc::now(), SectionStatus::Created)
    }

    #[test]
    fn test_not_created_is_vacuously_valid() {
        let verdict =
            section_verdict(&SectionSnapshot::not_created(), None, DEFAULT_MAX_DEPTH).unwrap();
        assert!(verdict.is_valid);
        assert_eq!(verdict.comparison_source, ComparisonSource::NotCreated);
        assert!(!verdict.counts_toward_mismatch());
    }

    #[test]
    fn test_matching_live_record_is_valid() {
        let data = json!({ "measured_area": 0.013 });
        let verdict =
            section_verdict(&stored(data.clone()), Some(&data), DEFAULT_MAX_DEPTH).unwrap();
        assert!(verdict.is_valid);
        assert_eq!(verdict.comparison_source, ComparisonSource::LiveDb);
        assert_eq!(verdict.stored_hash, verdict.current_hash);
    }

    #[test]
    fn test_drifted_live_record_is_a_mismatch() {
        let verdict = section_verdict(
            &stored(json!({ "measured_area": 0.013 })),
            Some(&json!({ "measured_area": 0.02 })),
            DEFAULT_MAX_DEPTH,
        )
        .unwrap();
        assert!(!verdict.is_valid);
        assert_eq!(verdict.comparison_source, ComparisonSource::LiveDb);
    }

    #[test]
    fn test_deleted_live_record_is_source_missing_not_mismatch() {
        let verdict = section_verdict(
            &stored(json!({ "measured_area": 0.013 })),
            None,
            DEFAULT_MAX_DEPTH,
        )
        .unwrap();
        assert!(!verdict.is_valid);
        assert_eq!(verdict.comparison_source, ComparisonSource::SourceMissing);
        assert_eq!(verdict.current_hash, None);
    }

    fn revision_chain(n: usize) -> Vec<Block> {
        let now = Utc::now();
        let ctx = OfficerContext::new("off1");
        let mut revisions: Vec<Block> = Vec::new();
        for i in 0..n {
            let mut sections = revisions
                .last()
                .map(|b: &Block| b.sections.clone())
                .unwrap_or_else(SectionSet::empty);
            let jmr = record_section(
                sections.get(SectionKind::Jmr),
                json!({ "measured_area": 0.013, "pass": i }),
                DEFAULT_MAX_DEPTH,
                now,
            )
            .unwrap();
            *sections.get_mut(SectionKind::Jmr) = jmr;
            let block = assemble_revision(
                revisions.last(),
                "67/4",
                EventType::JmrMeasurementUploaded,
                sections,
                &ctx,
                None,
                format!("BLOCK_67/4_{i}"),
                i as u64,
                now,
            )
            .unwrap();
            revisions.push(block);
        }
        revisions
    }

    #[test]
    fn test_revision_chain_walks_back_to_genesis() {
        let revisions = revision_chain(4);
        assert_eq!(revisions[0].previous_hash, GENESIS_HASH);
        let verdict = verify_revision_chain(&revisions);
        assert!(verdict.is_valid);
        assert_eq!(verdict.length, 4);
    }

    #[test]
    fn test_edited_stored_revision_is_detected() {
        let mut revisions = revision_chain(3);
        revisions[1].officer_id = "intruder".to_string();
        let verdict = verify_revision_chain(&revisions);
        assert!(!verdict.is_valid);
        assert_eq!(verdict.broken_at, Some(1));
        assert!(verdict.reason.unwrap().contains("re-derive"));
    }

    #[test]
    fn test_assembled_verdict_names_the_failing_section() {
        let revisions = revision_chain(1);
        let block = &revisions[0];

        let mut sections = BTreeMap::new();
        sections.insert(
            SectionKind::Jmr,
            section_verdict(
                block.sections.get(SectionKind::Jmr),
                Some(&json!({ "measured_area": 0.02 })),
                DEFAULT_MAX_DEPTH,
            )
            .unwrap(),
        );
        for kind in [
            SectionKind::Notice,
            SectionKind::Payment,
            SectionKind::Award,
            SectionKind::Landowner,
        ] {
            sections.insert(kind, SectionVerdict::not_created());
        }

        let verdict = assemble_verdict(
            block,
            sections,
            verify_revision_chain(&revisions),
            ChainVerdict::intact(1),
            "deadbeef".repeat(8),
            Utc::now(),
        );
        assert!(!verdict.is_valid);
        assert_eq!(verdict.status, VerdictStatus::Compromised);
        assert!(verdict.reason.contains("jmr"));
        assert_eq!(verdict.failed_sections(), vec![SectionKind::Jmr]);
    }
}
