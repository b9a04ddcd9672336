//! # Verification Path
//!
//! Rehydrates live section data, recomputes every hash, walks both chains,
//! and assembles the verdict. Reads only, except for the best-effort
//! write-back of the latest revision's `is_valid` flag after a *completed*
//! verification; a cancelled run persists nothing.

use super::LedgerService;
use crate::domain::hashing::{block_header_digest_with, NULL_SECTION_SENTINEL};
use crate::domain::timeline::verify_timeline;
use crate::domain::verify::{assemble_verdict, section_verdict, verify_revision_chain};
use crate::domain::keys;
use crate::ports::inbound::BulkFilter;
use crate::ports::outbound::{
    KeyValueStore, OfficerContextSource, SectionSource, TimeSource,
};
use ledger_types::{
    Block, ComparisonSource, IntegrityVerdict, LedgerError, SectionKind, SectionVerdict,
};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

impl<KV, SS, CX, TS> LedgerService<KV, SS, CX, TS>
where
    KV: KeyValueStore,
    SS: SectionSource,
    CX: OfficerContextSource,
    TS: TimeSource,
{
    /// Verify one survey. See [`Self::verify_integrity_with_cancel`].
    pub fn verify_integrity(&self, survey_number: &str) -> Result<IntegrityVerdict, LedgerError> {
        let cancel = AtomicBool::new(false);
        self.verify_integrity_with_cancel(survey_number, &cancel)
    }

    /// Verify one survey, checking `cancel` at every section boundary.
    ///
    /// A missing block is a `NotOnLedger` verdict, not an error. A raised
    /// cancel flag aborts with `LedgerError::Cancelled` and the partial
    /// verdict is discarded.
    pub fn verify_integrity_with_cancel(
        &self,
        survey_number: &str,
        cancel: &AtomicBool,
    ) -> Result<IntegrityVerdict, LedgerError> {
        let depth = self.config.max_canonical_depth;

        // 1. Fetch the stored chain.
        let revisions = self.load_revisions(survey_number)?;
        let Some(latest) = revisions.last() else {
            tracing::debug!("[ledger] verify {survey_number}: not on ledger");
            return Ok(IntegrityVerdict::not_on_ledger(survey_number, self.time.now()));
        };

        // 2-3. Rehydrate and recompute, section by section.
        let mut verdicts: BTreeMap<SectionKind, SectionVerdict> = BTreeMap::new();
        for kind in SectionKind::ALL {
            if cancel.load(Ordering::Relaxed) {
                return Err(LedgerError::Cancelled);
            }
            let stored = latest.sections.get(kind);
            let verdict = if stored.has_data() {
                let live = self.sections.fetch(survey_number, kind)?;
                section_verdict(stored, live.as_ref(), depth)?
            } else {
                SectionVerdict::not_created()
            };
            verdicts.insert(kind, verdict);
        }

        // 4. Aggregate: recompute the block digest over the recomputed
        // section hashes. A missing live record keeps its stored hash so the
        // loss is reported once, as source_missing.
        let mut hashes: BTreeMap<SectionKind, String> = BTreeMap::new();
        for (kind, verdict) in &verdicts {
            let hash = match verdict.comparison_source {
                ComparisonSource::LiveDb => verdict.current_hash.clone(),
                ComparisonSource::SourceMissing => verdict.stored_hash.clone(),
                ComparisonSource::LiveOnly | ComparisonSource::NotCreated => None,
            };
            hashes.insert(*kind, hash.unwrap_or_else(|| NULL_SECTION_SENTINEL.to_string()));
        }
        let recomputed_block_hash = block_header_digest_with(latest, &hashes)?;

        if cancel.load(Ordering::Relaxed) {
            return Err(LedgerError::Cancelled);
        }

        // 5. Chain walks: block revisions and timeline events.
        let block_chain = verify_revision_chain(&revisions);
        let timeline = verify_timeline(&self.load_events(survey_number)?, depth);

        // 6. Verdict.
        let verdict = assemble_verdict(
            latest,
            verdicts,
            block_chain,
            timeline,
            recomputed_block_hash,
            self.time.now(),
        );
        if !verdict.is_valid {
            tracing::warn!(
                "[ledger] ⚠ survey {survey_number} compromised: {}",
                verdict.reason
            );
        }
        self.record_verdict(latest, &verdict);
        Ok(verdict)
    }

    /// Best-effort persistence of the last-known verification result onto
    /// the latest revision. Skipped when the block moved on underneath the
    /// verification or the store is busy.
    fn record_verdict(&self, verified: &Block, verdict: &IntegrityVerdict) {
        let survey = &verified.survey_number;
        let outcome = self.with_survey_lock(survey, || {
            let Some(mut latest) = self.latest_block(survey)? else {
                return Ok(());
            };
            if latest.revision != verified.revision
                || latest.current_hash != verified.current_hash
            {
                return Ok(());
            }
            if latest.is_valid == verdict.is_valid {
                return Ok(());
            }
            latest.is_valid = verdict.is_valid;
            let bytes =
                serde_json::to_vec(&latest).map_err(|e| LedgerError::Store(e.to_string()))?;
            self.kv
                .put(&keys::block_key(survey, latest.revision), &bytes)?;
            Ok(())
        });
        if let Err(e) = outcome {
            tracing::debug!("[ledger] verdict write-back skipped for {survey}: {e}");
        }
    }

    /// Verify every survey on the ledger that passes `filter`.
    pub fn bulk_verify(&self, filter: &BulkFilter) -> Result<Vec<IntegrityVerdict>, LedgerError> {
        let cancel = AtomicBool::new(false);
        self.bulk_verify_with_cancel(filter, &cancel)
    }

    /// Bulk verification with cooperative cancellation. Surveys are
    /// independent; structural failures on one survey are logged and
    /// skipped rather than aborting the sweep.
    pub fn bulk_verify_with_cancel(
        &self,
        filter: &BulkFilter,
        cancel: &AtomicBool,
    ) -> Result<Vec<IntegrityVerdict>, LedgerError> {
        let surveys: Vec<String> = self
            .scan_all()?
            .into_iter()
            .filter(|b| filter.matches(&b.survey_number, b.project_id.as_deref()))
            .map(|b| b.survey_number)
            .collect();

        let verify_one = |survey: &String| -> Option<IntegrityVerdict> {
            if cancel.load(Ordering::Relaxed) {
                return None;
            }
            match self.verify_integrity_with_cancel(survey, cancel) {
                Ok(verdict) => Some(verdict),
                Err(LedgerError::Cancelled) => None,
                Err(e) => {
                    tracing::warn!("[ledger] sweep: verification failed for {survey}: {e}");
                    None
                }
            }
        };

        let verdicts: Vec<IntegrityVerdict> = if self.config.parallel_sweep {
            surveys.par_iter().filter_map(|s| verify_one(s)).collect()
        } else {
            surveys.iter().filter_map(|s| verify_one(s)).collect()
        };

        if cancel.load(Ordering::Relaxed) {
            return Err(LedgerError::Cancelled);
        }
        tracing::info!(
            "[ledger] sweep verified {} of {} surveys clean",
            verdicts.iter().filter(|v| v.is_valid).count(),
            verdicts.len()
        );
        Ok(verdicts)
    }

    /// The newest revision of every survey, ordered by `created_at`.
    pub fn scan_all(&self) -> Result<Vec<Block>, LedgerError> {
        let entries = self.kv.prefix_scan(keys::BLOCK_NAMESPACE)?;
        let mut latest: BTreeMap<String, Block> = BTreeMap::new();
        for (key, bytes) in entries {
            let block: Block = serde_json::from_slice(&bytes).map_err(|e| {
                LedgerError::from(ledger_types::StoreError::Corrupt(format!(
                    "block at {key}: {e}"
                )))
            })?;
            // Ascending scan order: later revisions overwrite earlier ones.
            latest.insert(block.survey_number.clone(), block);
        }
        let mut blocks: Vec<Block> = latest.into_values().collect();
        blocks.sort_by_key(|b| b.created_at);
        Ok(blocks)
    }
}
