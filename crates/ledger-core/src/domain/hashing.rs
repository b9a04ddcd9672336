//! # Hashing
//!
//! SHA-256 digests over canonical JSON. Two calls on semantically-equal but
//! structurally-reordered input return the same lowercase hex string, and no
//! wall-clock value ever reaches the hash input unless it is genuine domain
//! data.

use crate::domain::canonical::{canonicalize_with_depth, to_canonical_json, DEFAULT_MAX_DEPTH};
use ledger_types::{Block, CanonicalizationError, SectionKind};
use serde_json::{json, Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Stand-in hash for a section that has never been written. A missing hash
/// participates in the block digest as this fixed value, not as absence.
pub const NULL_SECTION_SENTINEL: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Lowercase hex SHA-256 of raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Digest a record: canonicalize, render the stable text form, hash.
pub fn digest(value: &Value) -> Result<String, CanonicalizationError> {
    digest_with_depth(value, DEFAULT_MAX_DEPTH)
}

/// Digest with an explicit canonicalization depth bound.
pub fn digest_with_depth(
    value: &Value,
    max_depth: usize,
) -> Result<String, CanonicalizationError> {
    let canonical = canonicalize_with_depth(value, max_depth)?;
    let text = to_canonical_json(&canonical)?;
    Ok(sha256_hex(text.as_bytes()))
}

/// Digest of a block's header: identity fields, chain link, nonce, and the
/// five section hashes. Wall-clock fields (`created_at`, `updated_at`,
/// section `last_updated`) are deliberately absent so the digest is
/// reproducible on every later read.
pub fn block_header_digest(block: &Block) -> Result<String, CanonicalizationError> {
    let hashes = stored_section_hashes(block);
    block_header_digest_with(block, &hashes)
}

/// Digest of a block's header with substituted section hashes (used by the
/// verifier to fold *recomputed* hashes into the aggregate comparison).
/// Sections absent from `section_hashes` fall back to the sentinel.
pub fn block_header_digest_with(
    block: &Block,
    section_hashes: &BTreeMap<SectionKind, String>,
) -> Result<String, CanonicalizationError> {
    let mut sections = Map::new();
    for kind in SectionKind::ALL {
        let hash = section_hashes
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| NULL_SECTION_SENTINEL.to_string());
        sections.insert(kind.as_str().to_string(), Value::String(hash));
    }

    let header = json!({
        "block_id": block.block_id,
        "survey_number": block.survey_number,
        "event_type": block.event_type.as_str(),
        "officer_id": block.officer_id,
        "project_id": block.project_id,
        "previous_hash": block.previous_hash,
        "nonce": block.nonce,
        "sections": Value::Object(sections),
    });

    digest(&header)
}

/// The per-section hashes a block currently stores (sentinel where absent).
pub fn stored_section_hashes(block: &Block) -> BTreeMap<SectionKind, String> {
    block
        .sections
        .iter()
        .map(|(kind, snap)| {
            let hash = snap
                .hash
                .clone()
                .unwrap_or_else(|| NULL_SECTION_SENTINEL.to_string());
            (kind, hash)
        })
        .collect()
}

/// Digest of a timeline event's payload: its scalars plus metadata. The
/// event timestamp is excluded; it is presentation data, not evidence.
pub fn event_digest(
    action: &str,
    officer_id: &str,
    remarks: Option<&str>,
    metadata: &Value,
    max_depth: usize,
) -> Result<String, CanonicalizationError> {
    let payload = json!({
        "action": action,
        "officer_id": officer_id,
        "remarks": remarks,
        "metadata": metadata,
    });
    digest_with_depth(&payload, max_depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::canonical::DEFAULT_MAX_DEPTH;
    use serde_json::json;

    #[test]
    fn test_digest_is_deterministic() {
        let record = json!({
            "survey_number": "67/4",
            "measured_area": 0.013,
            "owners": ["A", "B"],
        });
        assert_eq!(digest(&record).unwrap(), digest(&record).unwrap());
    }

    #[test]
    fn test_digest_is_key_order_independent() {
        let a: Value =
            serde_json::from_str(r#"{"measured_area":0.013,"survey_number":"67/4"}"#).unwrap();
        let b: Value =
            serde_json::from_str(r#"{"survey_number":"67/4","measured_area":0.013}"#).unwrap();
        assert_eq!(digest(&a).unwrap(), digest(&b).unwrap());
    }

    #[test]
    fn test_digest_excludes_stamped_timestamp() {
        let bare = json!({ "measured_area": 0.013 });
        let stamped = json!({
            "measured_area": 0.013,
            "timestamp": "2024-03-15T10:30:00Z",
        });
        let restamped = json!({
            "measured_area": 0.013,
            "timestamp": "2025-08-07T00:00:00Z",
        });
        let h = digest(&bare).unwrap();
        assert_eq!(digest(&stamped).unwrap(), h);
        assert_eq!(digest(&restamped).unwrap(), h);
    }

    #[test]
    fn test_digest_is_lowercase_hex_sha256() {
        let h = digest(&json!({ "a": 1 })).unwrap();
        assert_eq!(h.len(), 64);
        assert!(h.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()));
    }

    #[test]
    fn test_content_change_changes_digest() {
        let before = json!({ "measured_area": 0.013 });
        let after = json!({ "measured_area": 0.02 });
        assert_ne!(digest(&before).unwrap(), digest(&after).unwrap());
    }

    #[test]
    fn test_event_digest_covers_metadata() {
        let a = event_digest(
            "JMR_MEASUREMENT_UPLOADED",
            "off1",
            None,
            &json!({ "section": "jmr" }),
            DEFAULT_MAX_DEPTH,
        )
        .unwrap();
        let b = event_digest(
            "JMR_MEASUREMENT_UPLOADED",
            "off1",
            None,
            &json!({ "section": "notice" }),
            DEFAULT_MAX_DEPTH,
        )
        .unwrap();
        assert_ne!(a, b);
    }
}
