//! # Ledger API Implementation
//!
//! Binds [`LedgerApi`] to the service's write and verification paths.

use super::LedgerService;
use crate::ports::inbound::{BulkFilter, LedgerApi, RegisterRequest};
use crate::ports::outbound::{
    KeyValueStore, OfficerContextSource, SectionSource, TimeSource,
};
use ledger_types::{Block, IntegrityVerdict, LedgerError, TimelineEvent};

impl<KV, SS, CX, TS> LedgerApi for LedgerService<KV, SS, CX, TS>
where
    KV: KeyValueStore,
    SS: SectionSource,
    CX: OfficerContextSource,
    TS: TimeSource,
{
    fn register_or_update(&self, request: RegisterRequest) -> Result<Block, LedgerError> {
        LedgerService::register_or_update(self, request)
    }

    fn get_ledger(&self, survey_number: &str) -> Result<Block, LedgerError> {
        self.latest_block(survey_number)?
            .ok_or_else(|| LedgerError::NotFound {
                survey_number: survey_number.to_string(),
            })
    }

    fn get_timeline(&self, survey_number: &str) -> Result<Vec<TimelineEvent>, LedgerError> {
        let events = self.load_events(survey_number)?;
        if events.is_empty() && self.latest_block(survey_number)?.is_none() {
            return Err(LedgerError::NotFound {
                survey_number: survey_number.to_string(),
            });
        }
        Ok(events)
    }

    fn verify_integrity(&self, survey_number: &str) -> Result<IntegrityVerdict, LedgerError> {
        LedgerService::verify_integrity(self, survey_number)
    }

    fn bulk_verify(&self, filter: &BulkFilter) -> Result<Vec<IntegrityVerdict>, LedgerError> {
        LedgerService::bulk_verify(self, filter)
    }
}
