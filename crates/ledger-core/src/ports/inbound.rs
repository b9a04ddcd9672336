//! # Inbound Ports (Driving Ports)
//!
//! The primary API of the ledger engine. Implementations must enforce the
//! chain invariants on every write and report domain findings (mismatch,
//! missing source, not on ledger during verification) as verdict data.

use ledger_types::{
    Block, IntegrityVerdict, LedgerError, OfficerContext, SectionKind, TimelineEvent,
};
use serde_json::Value;

/// A request to record a section snapshot for a survey.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    /// Natural key of the land parcel (e.g. `67/4`).
    pub survey_number: String,
    /// Which of the five sections is being written.
    pub section: SectionKind,
    /// The record snapshot to hash and store.
    pub data: Value,
    /// Explicit writer identity. When absent, the engine asks its
    /// [`OfficerContextSource`](crate::ports::outbound::OfficerContextSource).
    pub context: Option<OfficerContext>,
    /// Free-form note carried onto the block and its timeline event.
    pub remarks: Option<String>,
}

impl RegisterRequest {
    pub fn new(survey_number: impl Into<String>, section: SectionKind, data: Value) -> Self {
        Self {
            survey_number: survey_number.into(),
            section,
            data,
            context: None,
            remarks: None,
        }
    }

    pub fn with_context(mut self, context: OfficerContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }
}

/// Narrowing filter for bulk verification sweeps.
#[derive(Debug, Clone, Default)]
pub struct BulkFilter {
    /// Restrict to these survey numbers (all when `None`).
    pub survey_numbers: Option<Vec<String>>,
    /// Restrict to blocks of this project.
    pub project_id: Option<String>,
}

impl BulkFilter {
    /// Sweep everything on the ledger.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_surveys(mut self, surveys: Vec<String>) -> Self {
        self.survey_numbers = Some(surveys);
        self
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Whether a block with this survey/project passes the filter.
    pub fn matches(&self, survey_number: &str, project_id: Option<&str>) -> bool {
        if let Some(surveys) = &self.survey_numbers {
            if !surveys.iter().any(|s| s == survey_number) {
                return false;
            }
        }
        if let Some(wanted) = &self.project_id {
            if project_id != Some(wanted.as_str()) {
                return false;
            }
        }
        true
    }
}

/// Primary API of the ledger engine.
pub trait LedgerApi {
    /// Record a section snapshot: creates the survey's block on first write,
    /// updates the section on every later write. Each call appends exactly
    /// one timeline event, even when the data is byte-identical.
    ///
    /// ## Errors
    ///
    /// - `Canonicalization`: the payload cannot be reduced to hashable form
    /// - `StoreTimeout`: store or per-survey lock wait expired (retryable)
    fn register_or_update(&self, request: RegisterRequest) -> Result<Block, LedgerError>;

    /// The survey's live block (its newest revision).
    ///
    /// ## Errors
    ///
    /// - `NotFound`: the survey has never been registered
    fn get_ledger(&self, survey_number: &str) -> Result<Block, LedgerError>;

    /// The survey's full timeline, in chronological order.
    ///
    /// ## Errors
    ///
    /// - `NotFound`: the survey has never been registered
    fn get_timeline(&self, survey_number: &str) -> Result<Vec<TimelineEvent>, LedgerError>;

    /// Re-derive the survey's hashes from live collaborator data and compare
    /// them to the stored block. A missing block yields a `NotOnLedger`
    /// verdict, not an error; mismatches and chain breaks are verdict data.
    ///
    /// ## Errors
    ///
    /// - `Source`: a collaborator was unreachable (distinct from a record
    ///   that is merely gone, which is a `source_missing` finding)
    /// - `StoreTimeout`: store wait expired (retryable)
    fn verify_integrity(&self, survey_number: &str) -> Result<IntegrityVerdict, LedgerError>;

    /// Verify every survey passing the filter, independently. Surveys whose
    /// verification fails structurally are logged and skipped; the sweep
    /// itself only fails on cancellation.
    fn bulk_verify(&self, filter: &BulkFilter) -> Result<Vec<IntegrityVerdict>, LedgerError>;
}
