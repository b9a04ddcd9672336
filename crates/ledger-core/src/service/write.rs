//! # Write Path
//!
//! Block creation, section updates, and live-data aggregation. Every
//! mutating operation runs under the survey's write lock and lands as one
//! atomic store batch: a new block revision plus exactly one timeline event.

use super::LedgerService;
use crate::domain::block::{assemble_revision, record_section};
use crate::domain::timeline::build_event;
use crate::ports::inbound::RegisterRequest;
use crate::ports::outbound::{
    KeyValueStore, OfficerContextSource, SectionSource, TimeSource,
};
use ledger_types::{
    Block, EventType, LedgerError, OfficerContext, SectionKind, SectionSet, TimelineEvent,
    GENESIS_HASH,
};
use serde_json::{json, Value};

/// Outcome of a bulk sync from the live collaborators.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// `(survey_number, error)` for every failed survey.
    pub errors: Vec<(String, String)>,
}

impl<KV, SS, CX, TS> LedgerService<KV, SS, CX, TS>
where
    KV: KeyValueStore,
    SS: SectionSource,
    CX: OfficerContextSource,
    TS: TimeSource,
{
    /// Record a section snapshot, creating the survey's block on first
    /// write and updating the section afterwards.
    pub fn register_or_update(&self, request: RegisterRequest) -> Result<Block, LedgerError> {
        let RegisterRequest {
            survey_number,
            section,
            data,
            context,
            remarks,
        } = request;
        let ctx = self.resolve_context(context);
        self.with_survey_lock(&survey_number, || {
            match self.latest_block(&survey_number)? {
                None => self.create_inner(&survey_number, section, data, &ctx, remarks),
                Some(prev) => self.update_inner(prev, section, data, &ctx, remarks),
            }
        })
    }

    /// First registration of a survey. Fails when a block already exists;
    /// callers wanting upsert semantics use [`Self::register_or_update`].
    pub fn register_survey(
        &self,
        survey_number: &str,
        section: SectionKind,
        data: Value,
        context: Option<OfficerContext>,
        remarks: Option<String>,
    ) -> Result<Block, LedgerError> {
        let ctx = self.resolve_context(context);
        self.with_survey_lock(survey_number, || {
            if self.latest_block(survey_number)?.is_some() {
                return Err(LedgerError::AlreadyRegistered {
                    survey_number: survey_number.to_string(),
                });
            }
            self.create_inner(survey_number, section, data, &ctx, remarks)
        })
    }

    /// Update one section of an existing block.
    ///
    /// ## Errors
    ///
    /// - `NotFound`: the survey was never registered; call
    ///   [`Self::register_or_update`] first
    pub fn update_section(
        &self,
        survey_number: &str,
        section: SectionKind,
        data: Value,
        context: Option<OfficerContext>,
        remarks: Option<String>,
    ) -> Result<Block, LedgerError> {
        let ctx = self.resolve_context(context);
        self.with_survey_lock(survey_number, || {
            let prev = self
                .latest_block(survey_number)?
                .ok_or_else(|| LedgerError::NotFound {
                    survey_number: survey_number.to_string(),
                })?;
            self.update_inner(prev, section, data, &ctx, remarks)
        })
    }

    fn create_inner(
        &self,
        survey_number: &str,
        section: SectionKind,
        data: Value,
        ctx: &OfficerContext,
        remarks: Option<String>,
    ) -> Result<Block, LedgerError> {
        let now = self.time.now();
        let depth = self.config.max_canonical_depth;

        let mut sections = SectionSet::empty();
        let snapshot = record_section(sections.get(section), data, depth, now)?;
        *sections.get_mut(section) = snapshot;

        let block = assemble_revision(
            None,
            survey_number,
            EventType::SurveyCreatedOnBlockchain,
            sections,
            ctx,
            remarks.clone(),
            self.new_block_id(survey_number),
            self.new_nonce(),
            now,
        )?;
        let event = self.section_event(&block, section, 0, GENESIS_HASH.to_string(), ctx, remarks)?;
        self.persist(&block, &event)?;

        tracing::info!(
            "[ledger] ✓ survey {} registered, block {} (section {})",
            survey_number,
            block.block_id,
            section
        );
        Ok(block)
    }

    fn update_inner(
        &self,
        prev: Block,
        section: SectionKind,
        data: Value,
        ctx: &OfficerContext,
        remarks: Option<String>,
    ) -> Result<Block, LedgerError> {
        let now = self.time.now();
        let depth = self.config.max_canonical_depth;

        let snapshot = record_section(prev.sections.get(section), data, depth, now)?;
        let mut sections = prev.sections.clone();
        *sections.get_mut(section) = snapshot;

        let block = assemble_revision(
            Some(&prev),
            &prev.survey_number,
            EventType::for_section(section),
            sections,
            ctx,
            remarks.clone(),
            self.new_block_id(&prev.survey_number),
            self.new_nonce(),
            now,
        )?;

        let (sequence, previous_hash) = self.next_event_link(&prev.survey_number)?;
        let event = self.section_event(&block, section, sequence, previous_hash, ctx, remarks)?;
        self.persist(&block, &event)?;

        tracing::info!(
            "[ledger] ✓ survey {} section {} updated (revision {})",
            block.survey_number,
            section,
            block.revision
        );
        Ok(block)
    }

    /// Re-aggregate every section of a survey from the live collaborators,
    /// creating or updating its block in one write.
    pub fn sync_from_sources(
        &self,
        survey_number: &str,
        context: Option<OfficerContext>,
        remarks: Option<String>,
    ) -> Result<Block, LedgerError> {
        let ctx = self.resolve_context(context);
        self.with_survey_lock(survey_number, || {
            let now = self.time.now();
            let depth = self.config.max_canonical_depth;
            let prev = self.latest_block(survey_number)?;

            let mut sections = prev
                .as_ref()
                .map(|b| b.sections.clone())
                .unwrap_or_else(SectionSet::empty);
            for kind in SectionKind::ALL {
                if let Some(live) = self.sections.fetch(survey_number, kind)? {
                    let snapshot = record_section(sections.get(kind), live, depth, now)?;
                    *sections.get_mut(kind) = snapshot;
                }
            }

            let event_type = if prev.is_some() {
                EventType::SurveyDataUpdated
            } else {
                EventType::SurveyCreatedOnBlockchain
            };
            let block = assemble_revision(
                prev.as_ref(),
                survey_number,
                event_type,
                sections,
                &ctx,
                remarks.clone(),
                self.new_block_id(survey_number),
                self.new_nonce(),
                now,
            )?;

            let (sequence, previous_hash) = self.next_event_link(survey_number)?;
            let metadata = json!({
                "source": "live_aggregation",
                "project_id": ctx.project_id,
                "sections_with_data": block.sections.recorded_count(),
            });
            let event = build_event(
                sequence,
                event_type.as_str(),
                &ctx.officer_id,
                remarks,
                metadata,
                previous_hash,
                depth,
                now,
            )?;
            self.persist(&block, &event)?;

            tracing::info!(
                "[ledger] ✓ survey {} synced from live data ({} sections)",
                survey_number,
                block.sections.recorded_count()
            );
            Ok(block)
        })
    }

    /// Sync every survey the collaborators know about. Failures are
    /// collected per survey, not fatal to the sweep.
    pub fn sync_all_from_sources(
        &self,
        context: Option<OfficerContext>,
    ) -> Result<SyncReport, LedgerError> {
        let ctx = self.resolve_context(context);
        let surveys = self.sections.survey_numbers()?;

        let mut report = SyncReport {
            total: surveys.len(),
            ..SyncReport::default()
        };
        for survey in surveys {
            match self.sync_from_sources(&survey, Some(ctx.clone()), None) {
                Ok(_) => report.successful += 1,
                Err(e) => {
                    tracing::warn!("[ledger] sync failed for {survey}: {e}");
                    report.failed += 1;
                    report.errors.push((survey, e.to_string()));
                }
            }
        }
        tracing::info!(
            "[ledger] bulk sync done: {}/{} surveys",
            report.successful,
            report.total
        );
        Ok(report)
    }

    /// Sequence number and back reference for the survey's next event.
    fn next_event_link(&self, survey_number: &str) -> Result<(u64, String), LedgerError> {
        let events = self.load_events(survey_number)?;
        Ok(match events.last() {
            Some(last) => (last.sequence + 1, last.data_hash.clone()),
            None => (0, GENESIS_HASH.to_string()),
        })
    }

    fn section_event(
        &self,
        block: &Block,
        section: SectionKind,
        sequence: u64,
        previous_hash: String,
        ctx: &OfficerContext,
        remarks: Option<String>,
    ) -> Result<TimelineEvent, LedgerError> {
        let metadata = json!({
            "section": section.as_str(),
            "data_hash": block.sections.get(section).hash,
            "project_id": ctx.project_id,
            "source": "ledger_service",
        });
        Ok(build_event(
            sequence,
            block.event_type.as_str(),
            &ctx.officer_id,
            remarks,
            metadata,
            previous_hash,
            self.config.max_canonical_depth,
            block.updated_at,
        )?)
    }
}
