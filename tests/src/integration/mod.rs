//! # Integration Tests
//!
//! Cross-layer flows through the public [`ledger_core::LedgerApi`] surface.

pub mod lifecycle;
pub mod persistence;
pub mod tamper;

use ledger_core::adapters::{InMemorySectionStore, MemoryStore, StaticOfficerContext, SystemTimeSource};
use ledger_core::{LedgerConfig, LedgerDependencies, LedgerService};
use ledger_types::SectionKind;
use serde_json::{json, Value};
use std::sync::Arc;

/// Service wired with shared adapters so tests can reach behind the API:
/// the section store doubles as the tamper vector, the KV store as the
/// hostile-DBA vector.
pub struct Harness {
    pub service: LedgerService<
        Arc<MemoryStore>,
        Arc<InMemorySectionStore>,
        StaticOfficerContext,
        SystemTimeSource,
    >,
    pub kv: Arc<MemoryStore>,
    pub live: Arc<InMemorySectionStore>,
}

impl Harness {
    pub fn new() -> Self {
        let kv = Arc::new(MemoryStore::new());
        let live = Arc::new(InMemorySectionStore::new());
        let service = LedgerService::new(
            LedgerDependencies {
                kv_store: kv.clone(),
                section_source: live.clone(),
                context_source: StaticOfficerContext::new("off1").with_project("proj1"),
                time_source: SystemTimeSource,
            },
            LedgerConfig::default(),
        );
        Self { service, kv, live }
    }

    /// Seed the live store and register the same snapshot on the ledger.
    pub fn register(&self, survey: &str, section: SectionKind, data: Value) {
        use ledger_core::{LedgerApi, RegisterRequest};
        self.live.upsert(survey, section, data.clone());
        self.service
            .register_or_update(RegisterRequest::new(survey, section, data))
            .unwrap();
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

pub fn jmr_record(survey: &str) -> Value {
    json!({
        "survey_number": survey,
        "measured_area": 0.013,
        "village": "Khamloli",
        "taluka": "Palghar",
    })
}
