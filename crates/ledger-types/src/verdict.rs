//! # Verification Verdicts
//!
//! Structured results of an integrity check. Mismatches, missing sources,
//! and chain breaks are reported here as data so a caller can render
//! "Verified" / "Compromised" / "Not on ledger" without catching errors for
//! normal business outcomes.

use crate::section::SectionKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a section verdict was able to compare against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonSource {
    /// Stored hash compared against the live collaborator record.
    LiveDb,
    /// Ledger has a snapshot but the live record is gone. Reported as
    /// invalid, distinct from a hash mismatch.
    SourceMissing,
    /// Live record exists but the ledger never hashed this section.
    /// Vacuously valid; nothing was promised.
    LiveOnly,
    /// Section never created; excluded from the mismatch count.
    NotCreated,
}

/// Verdict for a single section of a survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionVerdict {
    pub is_valid: bool,
    /// Hash recorded on the ledger at last write, if any.
    pub stored_hash: Option<String>,
    /// Hash recomputed from the live collaborator record, if available.
    pub current_hash: Option<String>,
    pub comparison_source: ComparisonSource,
    pub last_updated: Option<DateTime<Utc>>,
}

impl SectionVerdict {
    /// Verdict for a section that was never created.
    pub fn not_created() -> Self {
        Self {
            is_valid: true,
            stored_hash: None,
            current_hash: None,
            comparison_source: ComparisonSource::NotCreated,
            last_updated: None,
        }
    }

    /// Whether this section participates in the mismatch count.
    pub fn counts_toward_mismatch(&self) -> bool {
        matches!(
            self.comparison_source,
            ComparisonSource::LiveDb | ComparisonSource::SourceMissing
        )
    }
}

/// Result of walking a hash chain (block revisions or timeline events).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainVerdict {
    pub is_valid: bool,
    /// Number of links inspected.
    pub length: u64,
    /// Index of the first broken link, if any.
    pub broken_at: Option<u64>,
    /// Human-readable description of the break, if any.
    pub reason: Option<String>,
}

impl ChainVerdict {
    /// A verdict for an intact chain of `length` links.
    pub fn intact(length: u64) -> Self {
        Self {
            is_valid: true,
            length,
            broken_at: None,
            reason: None,
        }
    }

    /// A verdict for a chain broken at `index`.
    pub fn broken(length: u64, index: u64, reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            length,
            broken_at: Some(index),
            reason: Some(reason.into()),
        }
    }
}

/// Overall outcome category of a verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    /// Everything recomputed to the stored values.
    Verified,
    /// At least one section, chain, or the block digest drifted.
    Compromised,
    /// The survey has no block on the ledger.
    NotOnLedger,
}

/// The complete verdict for one survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityVerdict {
    pub survey_number: String,
    pub status: VerdictStatus,
    /// `status == Verified`. Kept as a plain flag for callers that only
    /// branch on pass/fail.
    pub is_valid: bool,
    /// Names what failed (sections, chain, block digest) or states success.
    pub reason: String,
    /// Per-section verdicts, keyed by section name.
    pub sections: BTreeMap<SectionKind, SectionVerdict>,
    /// Walk of the block revision chain, when a block exists.
    pub block_chain: Option<ChainVerdict>,
    /// Walk of the timeline event chain, when a block exists.
    pub timeline: Option<ChainVerdict>,
    /// `current_hash` stored on the latest revision.
    pub stored_block_hash: Option<String>,
    /// Block digest recomputed over live section hashes.
    pub recomputed_block_hash: Option<String>,
    /// Whether the two block digests agree, when a block exists.
    pub block_hash_match: Option<bool>,
    pub verified_at: DateTime<Utc>,
}

impl IntegrityVerdict {
    /// The verdict for a survey that has no block on the ledger.
    pub fn not_on_ledger(survey_number: impl Into<String>, at: DateTime<Utc>) -> Self {
        let survey_number = survey_number.into();
        Self {
            reason: format!("survey {survey_number} is not on the ledger"),
            survey_number,
            status: VerdictStatus::NotOnLedger,
            is_valid: false,
            sections: BTreeMap::new(),
            block_chain: None,
            timeline: None,
            stored_block_hash: None,
            recomputed_block_hash: None,
            block_hash_match: None,
            verified_at: at,
        }
    }

    /// Sections that failed their comparison.
    pub fn failed_sections(&self) -> Vec<SectionKind> {
        self.sections
            .iter()
            .filter(|(_, v)| !v.is_valid)
            .map(|(k, _)| *k)
            .collect()
    }
}
