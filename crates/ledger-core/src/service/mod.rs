//! # Ledger Service
//!
//! The application service implementing [`LedgerApi`]. Dependency injection
//! via generics: the service owns its ports and is `Send + Sync`, so one
//! instance can be shared across threads.
//!
//! ## Thread Safety
//!
//! Mutating operations on a given survey are serialized through a per-survey
//! lock registry with a bounded wait; reads never take that lock. Every
//! write lands as one atomic store batch, so a read racing a write observes
//! the pre- or post-write state, never a mix.

mod api;
mod verify;
mod write;


pub use write::SyncReport;

use crate::domain::config::LedgerConfig;
use crate::domain::keys;
use crate::ports::outbound::{
    BatchOperation, KeyValueStore, OfficerContextSource, SectionSource, TimeSource,
};
use ledger_types::{Block, LedgerError, OfficerContext, StoreError, TimelineEvent};
use parking_lot::Mutex;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Dependencies for [`LedgerService`].
pub struct LedgerDependencies<KV, SS, CX, TS> {
    pub kv_store: KV,
    pub section_source: SS,
    pub context_source: CX,
    pub time_source: TS,
}

/// The ledger engine service.
pub struct LedgerService<KV, SS, CX, TS>
where
    KV: KeyValueStore,
    SS: SectionSource,
    CX: OfficerContextSource,
    TS: TimeSource,
{
    /// Key-value store for blocks and timeline events.
    pub(crate) kv: KV,
    /// Live-data gateway to the owning subsystems.
    pub(crate) sections: SS,
    /// Officer identity fallback for writes without an explicit context.
    pub(crate) context: CX,
    /// Clock.
    pub(crate) time: TS,
    /// Engine configuration.
    pub(crate) config: LedgerConfig,
    /// Per-survey write locks.
    survey_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<KV, SS, CX, TS> LedgerService<KV, SS, CX, TS>
where
    KV: KeyValueStore,
    SS: SectionSource,
    CX: OfficerContextSource,
    TS: TimeSource,
{
    /// Create a new service with the given dependencies.
    pub fn new(deps: LedgerDependencies<KV, SS, CX, TS>, config: LedgerConfig) -> Self {
        Self {
            kv: deps.kv_store,
            sections: deps.section_source,
            context: deps.context_source,
            time: deps.time_source,
            config,
            survey_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Run `f` while holding the survey's write lock. The wait is bounded;
    /// expiry surfaces as a retryable `StoreTimeout`.
    pub(crate) fn with_survey_lock<T>(
        &self,
        survey_number: &str,
        f: impl FnOnce() -> Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        let handle = {
            let mut locks = self.survey_locks.lock();
            locks
                .entry(survey_number.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let guard = handle
            .try_lock_for(self.config.lock_timeout)
            .ok_or(LedgerError::StoreTimeout {
                waited_ms: self.config.lock_timeout.as_millis() as u64,
            })?;
        let out = f();
        drop(guard);
        out
    }

    /// All persisted revisions of a survey, ascending.
    pub(crate) fn load_revisions(&self, survey_number: &str) -> Result<Vec<Block>, LedgerError> {
        let entries = self.kv.prefix_scan(&keys::block_prefix(survey_number))?;
        entries
            .into_iter()
            .map(|(key, bytes)| {
                serde_json::from_slice(&bytes).map_err(|e| {
                    LedgerError::from(StoreError::Corrupt(format!("block at {key}: {e}")))
                })
            })
            .collect()
    }

    /// The survey's newest revision, if any.
    pub(crate) fn latest_block(&self, survey_number: &str) -> Result<Option<Block>, LedgerError> {
        Ok(self.load_revisions(survey_number)?.pop())
    }

    /// All timeline events of a survey, chronological.
    pub(crate) fn load_events(
        &self,
        survey_number: &str,
    ) -> Result<Vec<TimelineEvent>, LedgerError> {
        let entries = self.kv.prefix_scan(&keys::timeline_prefix(survey_number))?;
        entries
            .into_iter()
            .map(|(key, bytes)| {
                serde_json::from_slice(&bytes).map_err(|e| {
                    LedgerError::from(StoreError::Corrupt(format!("event at {key}: {e}")))
                })
            })
            .collect()
    }

    /// Persist one block revision and its timeline event as a single batch.
    pub(crate) fn persist(
        &self,
        block: &Block,
        event: &TimelineEvent,
    ) -> Result<(), LedgerError> {
        let block_bytes =
            serde_json::to_vec(block).map_err(|e| LedgerError::Store(e.to_string()))?;
        let event_bytes =
            serde_json::to_vec(event).map_err(|e| LedgerError::Store(e.to_string()))?;
        self.kv.atomic_batch_write(vec![
            BatchOperation::put(
                keys::block_key(&block.survey_number, block.revision),
                block_bytes,
            ),
            BatchOperation::put(
                keys::timeline_key(&block.survey_number, event.sequence),
                event_bytes,
            ),
        ])?;
        Ok(())
    }

    /// Explicit context when given, otherwise the ambient officer context.
    pub(crate) fn resolve_context(&self, explicit: Option<OfficerContext>) -> OfficerContext {
        explicit.unwrap_or_else(|| self.context.current())
    }

    pub(crate) fn new_block_id(&self, survey_number: &str) -> String {
        format!("BLOCK_{}_{}", survey_number, Uuid::new_v4().simple())
    }

    pub(crate) fn new_nonce(&self) -> u64 {
        rand::thread_rng().gen_range(0..1_000_000)
    }
}
