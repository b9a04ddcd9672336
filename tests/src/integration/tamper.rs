//! # Tamper Detection
//!
//! Out-of-band edits against the live collaborators and against the store
//! itself, and the bulk sweep that reports them.

#[cfg(test)]
mod tests {
    use crate::integration::{jmr_record, Harness};
    use ledger_core::{BulkFilter, KeyValueStore, LedgerApi, SectionSource};
    use ledger_types::{Block, ComparisonSource, SectionKind, VerdictStatus};
    use serde_json::json;

    #[test]
    fn test_live_edit_without_ledger_write_is_compromised() {
        let h = Harness::new();
        h.register("67/4", SectionKind::Jmr, jmr_record("67/4"));

        h.live.upsert(
            "67/4",
            SectionKind::Jmr,
            json!({
                "survey_number": "67/4",
                "measured_area": 0.02,
                "village": "Khamloli",
                "taluka": "Palghar",
            }),
        );

        let verdict = h.service.verify_integrity("67/4").unwrap();
        assert_eq!(verdict.status, VerdictStatus::Compromised);
        assert!(!verdict.sections[&SectionKind::Jmr].is_valid);
        assert!(verdict.reason.contains("jmr"));

        // A follow-up corrective write through the ledger heals the survey.
        h.service
            .update_section(
                "67/4",
                SectionKind::Jmr,
                h.live.fetch("67/4", SectionKind::Jmr).unwrap().unwrap(),
                None,
                Some("re-recorded after field audit".into()),
            )
            .unwrap();
        let verdict = h.service.verify_integrity("67/4").unwrap();
        assert!(verdict.is_valid, "{}", verdict.reason);
    }

    #[test]
    fn test_deleted_collaborator_row_is_source_missing() {
        let h = Harness::new();
        h.register("67/4", SectionKind::Jmr, jmr_record("67/4"));
        h.live.remove("67/4", SectionKind::Jmr);

        let verdict = h.service.verify_integrity("67/4").unwrap();
        assert!(!verdict.is_valid);
        assert_eq!(
            verdict.sections[&SectionKind::Jmr].comparison_source,
            ComparisonSource::SourceMissing
        );
        // Preserved as its own reason, not collapsed into "mismatch".
        assert!(verdict.reason.contains("live source missing"));
    }

    #[test]
    fn test_edited_stored_block_breaks_the_revision_chain() {
        let h = Harness::new();
        h.register("67/4", SectionKind::Jmr, jmr_record("67/4"));

        // A hostile DBA rewrites the stored revision directly.
        let key = {
            let entries = h.kv.prefix_scan("b:").unwrap();
            entries[0].0.clone()
        };
        let mut block: Block =
            serde_json::from_slice(&h.kv.get(&key).unwrap().unwrap()).unwrap();
        block.officer_id = "intruder".into();
        h.kv.put(&key, &serde_json::to_vec(&block).unwrap()).unwrap();

        let verdict = h.service.verify_integrity("67/4").unwrap();
        assert!(!verdict.is_valid);
        let chain = verdict.block_chain.unwrap();
        assert!(!chain.is_valid);
        assert!(chain.reason.unwrap().contains("re-derive"));
    }

    #[test]
    fn test_edited_timeline_event_breaks_the_timeline() {
        let h = Harness::new();
        h.register("67/4", SectionKind::Jmr, jmr_record("67/4"));

        let key = {
            let entries = h.kv.prefix_scan("t:").unwrap();
            entries[0].0.clone()
        };
        let mut event: ledger_types::TimelineEvent =
            serde_json::from_slice(&h.kv.get(&key).unwrap().unwrap()).unwrap();
        event.metadata = json!({ "section": "award", "forged": true });
        h.kv.put(&key, &serde_json::to_vec(&event).unwrap()).unwrap();

        let verdict = h.service.verify_integrity("67/4").unwrap();
        assert!(!verdict.is_valid);
        assert!(!verdict.timeline.unwrap().is_valid);
        assert!(verdict.reason.contains("timeline chain broken"));
    }

    #[test]
    fn test_bulk_sweep_over_mixed_population() {
        let h = Harness::new();
        for survey in ["67/4", "12/1A", "gat-88"] {
            h.register(survey, SectionKind::Jmr, jmr_record(survey));
        }
        // One survey drifts.
        h.live
            .upsert("12/1A", SectionKind::Jmr, json!({ "measured_area": 9.9 }));

        let verdicts = h.service.bulk_verify(&BulkFilter::all()).unwrap();
        assert_eq!(verdicts.len(), 3);
        let clean = verdicts.iter().filter(|v| v.is_valid).count();
        assert_eq!(clean, 2);
        let bad = verdicts.iter().find(|v| !v.is_valid).unwrap();
        assert_eq!(bad.survey_number, "12/1A");
    }
}
