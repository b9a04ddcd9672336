//! # Block Types
//!
//! A block is the persisted, hash-linked record of one survey's section
//! hashes at a point in time. Every write through the ledger lands as a new
//! immutable revision; the newest revision is the survey's live block, and
//! each revision's `previous_hash` carries the prior revision's
//! `current_hash` so the whole history chains back to the genesis constant.

use crate::section::{SectionKind, SectionSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `previous_hash` of the first revision of every survey chain.
pub const GENESIS_HASH: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000000";

/// Returns `true` when `hash` is the genesis constant.
pub fn is_genesis(hash: &str) -> bool {
    hash == GENESIS_HASH
}

/// The action that produced a block revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// First registration of the survey on the ledger.
    SurveyCreatedOnBlockchain,
    /// Re-aggregation of all sections from the live collaborators.
    SurveyDataUpdated,
    /// JMR measurement recorded or revised.
    JmrMeasurementUploaded,
    /// Acquisition notice recorded.
    NoticeGenerated,
    /// Payment slip recorded.
    PaymentSlipCreated,
    /// Award declaration recorded.
    AwardDeclared,
    /// Landowner / ownership record changed.
    OwnershipUpdated,
}

impl EventType {
    /// The event type produced by a write to the given section.
    pub fn for_section(kind: SectionKind) -> Self {
        match kind {
            SectionKind::Jmr => EventType::JmrMeasurementUploaded,
            SectionKind::Notice => EventType::NoticeGenerated,
            SectionKind::Payment => EventType::PaymentSlipCreated,
            SectionKind::Award => EventType::AwardDeclared,
            SectionKind::Landowner => EventType::OwnershipUpdated,
        }
    }

    /// The SCREAMING_SNAKE_CASE wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::SurveyCreatedOnBlockchain => "SURVEY_CREATED_ON_BLOCKCHAIN",
            EventType::SurveyDataUpdated => "SURVEY_DATA_UPDATED",
            EventType::JmrMeasurementUploaded => "JMR_MEASUREMENT_UPLOADED",
            EventType::NoticeGenerated => "NOTICE_GENERATED",
            EventType::PaymentSlipCreated => "PAYMENT_SLIP_CREATED",
            EventType::AwardDeclared => "AWARD_DECLARED",
            EventType::OwnershipUpdated => "OWNERSHIP_UPDATED",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the officer who triggered a ledger write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerContext {
    pub officer_id: String,
    pub project_id: Option<String>,
}

impl OfficerContext {
    pub fn new(officer_id: impl Into<String>) -> Self {
        Self {
            officer_id: officer_id.into(),
            project_id: None,
        }
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }
}

/// One persisted revision of a survey's ledger block.
///
/// `current_hash` is reproducible: it is the digest of the block's identity
/// fields plus the five section hashes, and deliberately excludes every
/// wall-clock field (`created_at`, `updated_at`, section `last_updated`), so
/// recomputing it later over unaltered content yields the stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Unique block identifier (`BLOCK_<survey>_<uuid>`).
    pub block_id: String,
    /// Natural key: the survey number this block tracks.
    pub survey_number: String,
    /// The action that produced this revision.
    pub event_type: EventType,
    /// Officer who triggered the write.
    pub officer_id: String,
    /// Project the survey belongs to, when known.
    pub project_id: Option<String>,
    /// The five section snapshots.
    pub sections: SectionSet,
    /// `current_hash` of the previous revision, or [`GENESIS_HASH`].
    pub previous_hash: String,
    /// Digest over identity fields + section hashes (see type docs).
    pub current_hash: String,
    /// Opaque randomness salting the block hash. Not proof-of-work.
    pub nonce: u64,
    /// Last-known verification result for this survey.
    pub is_valid: bool,
    /// Free-form note supplied by the writer.
    pub remarks: Option<String>,
    /// Zero-based revision number within the survey's chain.
    pub revision: u64,
    /// When revision 0 of this survey was written.
    pub created_at: DateTime<Utc>,
    /// When this revision was written.
    pub updated_at: DateTime<Utc>,
}

impl Block {
    /// Whether this is the first revision of its survey chain.
    pub fn is_genesis_revision(&self) -> bool {
        is_genesis(&self.previous_hash)
    }
}
