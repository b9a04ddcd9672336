//! # Collaborator Adapters
//!
//! Controllable stand-ins for the owning subsystems. Tests use
//! [`InMemorySectionStore`] both as the live-data source and as the tamper
//! vector: overwriting a record here without going through the ledger is
//! exactly the out-of-band edit the verifier must catch.

use crate::ports::outbound::{OfficerContextSource, SectionSource};
use ledger_types::{OfficerContext, SectionKind, SourceError};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::BTreeMap;

/// In-memory live-data store keyed by `(survey_number, section)`.
#[derive(Default)]
pub struct InMemorySectionStore {
    records: RwLock<BTreeMap<(String, SectionKind), Value>>,
}

impl InMemorySectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a live record. Calling this *without* a matching
    /// ledger write is an out-of-band mutation.
    pub fn upsert(&self, survey_number: impl Into<String>, section: SectionKind, record: Value) {
        self.records
            .write()
            .insert((survey_number.into(), section), record);
    }

    /// Delete a live record (simulates a collaborator losing its row).
    pub fn remove(&self, survey_number: &str, section: SectionKind) {
        self.records
            .write()
            .remove(&(survey_number.to_string(), section));
    }
}

impl SectionSource for InMemorySectionStore {
    fn fetch(
        &self,
        survey_number: &str,
        section: SectionKind,
    ) -> Result<Option<Value>, SourceError> {
        Ok(self
            .records
            .read()
            .get(&(survey_number.to_string(), section))
            .cloned())
    }

    fn survey_numbers(&self) -> Result<Vec<String>, SourceError> {
        let records = self.records.read();
        let mut surveys: Vec<String> = records.keys().map(|(s, _)| s.clone()).collect();
        surveys.dedup();
        Ok(surveys)
    }
}

/// Officer context source that always answers with one fixed identity.
pub struct StaticOfficerContext {
    context: OfficerContext,
}

impl StaticOfficerContext {
    pub fn new(officer_id: impl Into<String>) -> Self {
        Self {
            context: OfficerContext::new(officer_id),
        }
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.context.project_id = Some(project_id.into());
        self
    }
}

impl OfficerContextSource for StaticOfficerContext {
    fn current(&self) -> OfficerContext {
        self.context.clone()
    }
}
