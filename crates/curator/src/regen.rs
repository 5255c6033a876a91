//! Regeneration of reported progressions.
//!
//! One pass fetches every pending report, groups them by progression, and
//! re-runs the generation pipeline with each progression's original
//! parameters. A group's updates - new content, cleared report state, a
//! single regeneration-count bump, resolved reports - commit as one store
//! transaction. A failing group is logged and skipped; the loop keeps
//! going.
//!
//! Assumes at most one concurrent invocation: there is no cross-invocation
//! lock, so overlapping runs can regenerate the same progression twice.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chordsmith::{GenerationOrchestrator, GenerationParams};
use shedstore::{ProgressionStore, ReportId, ReportRecord, StoreError};
use tracing::{info, warn};

/// Summary of one scheduler pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegenReport {
    pub groups: usize,
    pub regenerated: usize,
    pub skipped_missing: usize,
    pub failed: usize,
}

/// Process every pending report once. Only the initial report fetch can
/// fail the run as a whole; per-group faults are contained.
pub async fn run(
    store: &ProgressionStore,
    orchestrator: &GenerationOrchestrator,
) -> Result<RegenReport, StoreError> {
    let pending = store.pending_reports()?;

    // group by progression, preserving first-seen order
    let mut order: Vec<String> = Vec::new();
    let mut by_progression: HashMap<String, Vec<ReportRecord>> = HashMap::new();
    for report in pending {
        match by_progression.entry(report.progression_id.0.clone()) {
            Entry::Occupied(mut entry) => entry.get_mut().push(report),
            Entry::Vacant(entry) => {
                order.push(entry.key().clone());
                entry.insert(vec![report]);
            }
        }
    }

    let mut summary = RegenReport {
        groups: order.len(),
        ..Default::default()
    };

    for progression_id in order {
        let reports = &by_progression[&progression_id];
        match regenerate_group(store, orchestrator, &progression_id, reports).await {
            Ok(true) => summary.regenerated += 1,
            Ok(false) => summary.skipped_missing += 1,
            Err(e) => {
                warn!(
                    progression = %progression_id,
                    error = %e,
                    "regeneration group failed, continuing with the next group"
                );
                summary.failed += 1;
            }
        }
    }

    info!(
        groups = summary.groups,
        regenerated = summary.regenerated,
        skipped = summary.skipped_missing,
        failed = summary.failed,
        "regeneration pass complete"
    );
    Ok(summary)
}

/// Regenerate one progression and resolve its reports. Returns false when
/// the progression no longer exists (non-fatal skip).
async fn regenerate_group(
    store: &ProgressionStore,
    orchestrator: &GenerationOrchestrator,
    progression_id: &str,
    reports: &[ReportRecord],
) -> Result<bool, StoreError> {
    let Some(progression) = store.get_progression(progression_id)? else {
        warn!(progression = %progression_id, "reported progression no longer exists, skipping group");
        return Ok(false);
    };

    let params = GenerationParams {
        key: progression.key.clone(),
        scale: progression.scale.clone(),
        mood: progression.mood.clone(),
        style: progression.style.clone(),
        starting_chord: None,
    };

    // infallible: model faults land on the fallback path inside
    let generated = orchestrator.generate(&params).await;

    let report_ids: Vec<ReportId> = reports.iter().map(|r| r.id.clone()).collect();
    store.apply_regeneration(
        progression_id,
        &generated.chords,
        generated.numerals.as_deref(),
        &generated.insights,
        &report_ids,
    )?;

    info!(
        progression = %progression_id,
        reports = report_ids.len(),
        source = ?generated.source,
        "progression regenerated"
    );
    Ok(true)
}
