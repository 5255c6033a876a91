//! End-to-end exercises of the curation jobs against a real (temporary)
//! store and a mocked model client.

use std::sync::Arc;

use async_trait::async_trait;
use chordsmith::{ChordModel, GenerationOrchestrator, ModelError};
use curator::{dedup, regen, DedupConfig};
use shedstore::{NewProgression, ProgressionStore, ReportStatus};

struct FailingModel;

#[async_trait]
impl ChordModel for FailingModel {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, ModelError> {
        Err(ModelError::MissingContent)
    }
}

struct CannedModel(String);

#[async_trait]
impl ChordModel for CannedModel {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, ModelError> {
        Ok(self.0.clone())
    }
}

fn long_insight() -> String {
    "The loop leans on the pull between tonic and dominant, and the interior minor chord \
     shades each return so repeats stay interesting over a long vamp."
        .to_string()
}

fn model_payload() -> String {
    serde_json::json!({
        "chords": ["D", "A", "Bm", "F#m", "G", "D", "G", "A"],
        "insights": [long_insight(), long_insight(), long_insight()],
        "numerals": ["I", "V", "vi", "iii", "IV", "I", "IV", "V"],
    })
    .to_string()
}

fn seeded(chords: &[&str]) -> NewProgression {
    NewProgression {
        key: "C".to_string(),
        scale: "major".to_string(),
        mood: "happy".to_string(),
        style: "pop".to_string(),
        chords: chords.iter().map(|c| c.to_string()).collect(),
        numerals: None,
        insights: vec![long_insight(), long_insight(), long_insight()],
    }
}

#[tokio::test]
async fn three_reports_one_regeneration() {
    let store = ProgressionStore::in_memory().unwrap();
    let rec = store.insert_progression(seeded(&["C", "Am", "F", "G"])).unwrap();

    for reason in ["dissonant", "boring", "wrong mood"] {
        store.file_report(&rec.id.0, reason, "").unwrap();
    }
    assert_eq!(store.pending_reports().unwrap().len(), 3);

    let orchestrator = GenerationOrchestrator::new(Arc::new(CannedModel(model_payload())));
    let summary = regen::run(&store, &orchestrator).await.unwrap();

    assert_eq!(summary.groups, 1);
    assert_eq!(summary.regenerated, 1);
    assert_eq!(summary.failed, 0);

    let rec = store.get_progression(&rec.id.0).unwrap().unwrap();
    // one bump regardless of how many reports triggered the group
    assert_eq!(rec.regeneration_count, 1);
    assert!(!rec.reported);
    assert!(rec.report_reason.is_none());
    assert_eq!(rec.chords.len(), 8);

    for report in store.reports_for(&rec.id.0).unwrap() {
        assert_eq!(report.status, ReportStatus::Regenerated);
        assert!(report.resolved_at.is_some());
    }
    assert!(store.pending_reports().unwrap().is_empty());
}

#[tokio::test]
async fn missing_progression_skips_group_without_stopping_the_run() {
    let store = ProgressionStore::in_memory().unwrap();

    let doomed = store.insert_progression(seeded(&["C", "F"])).unwrap();
    let healthy = store.insert_progression(seeded(&["C", "G", "Am", "F"])).unwrap();
    store.file_report(&doomed.id.0, "bad", "").unwrap();
    store.file_report(&healthy.id.0, "bad", "").unwrap();

    // reports are kept alive past their progression to simulate a stale queue
    {
        let conn = store.conn().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = OFF").unwrap();
        conn.execute("DELETE FROM progressions WHERE id = ?1", [&doomed.id.0])
            .unwrap();
    }

    let orchestrator = GenerationOrchestrator::new(Arc::new(FailingModel));
    let summary = regen::run(&store, &orchestrator).await.unwrap();

    assert_eq!(summary.groups, 2);
    assert_eq!(summary.skipped_missing, 1);
    assert_eq!(summary.regenerated, 1);

    let healthy = store.get_progression(&healthy.id.0).unwrap().unwrap();
    assert_eq!(healthy.regeneration_count, 1);
}

#[tokio::test]
async fn regeneration_falls_back_when_the_model_is_down() {
    let store = ProgressionStore::in_memory().unwrap();
    let rec = store.insert_progression(seeded(&["C", "Am", "F", "G"])).unwrap();
    store.file_report(&rec.id.0, "bad", "").unwrap();

    let orchestrator = GenerationOrchestrator::new(Arc::new(FailingModel));
    let summary = regen::run(&store, &orchestrator).await.unwrap();
    assert_eq!(summary.regenerated, 1);

    let rec = store.get_progression(&rec.id.0).unwrap().unwrap();
    assert!(rec.chords.len() >= 4);
    assert_eq!(rec.insights.len(), 3);
    let numerals = rec.numerals.expect("fallback carries numerals");
    assert_eq!(numerals.len(), rec.chords.len());
}

#[tokio::test]
async fn generated_duplicates_deduplicate_end_to_end() {
    let store = ProgressionStore::in_memory().unwrap();
    let orchestrator = GenerationOrchestrator::new(Arc::new(CannedModel(model_payload())));

    // identical model output persisted three times produces duplicates
    for _ in 0..3 {
        let generated = orchestrator
            .generate(&chordsmith::GenerationParams::default())
            .await;
        store
            .insert_progression(NewProgression {
                key: "C".to_string(),
                scale: "major".to_string(),
                mood: "happy".to_string(),
                style: "pop".to_string(),
                chords: generated.chords,
                numerals: generated.numerals,
                insights: generated.insights,
            })
            .unwrap();
    }

    let report = dedup::run(&store, &DedupConfig::default()).unwrap();
    assert_eq!(report.scanned, 3);
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.deleted, 2);
    assert_eq!(store.count_progressions().unwrap(), 1);
}
