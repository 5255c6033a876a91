//! Content-keyed deduplication over the persisted corpus.
//!
//! One run scans a single point-in-time snapshot of the store, groups
//! records by exact content key, keeps the highest-scoring member of each
//! duplicate group, and deletes the rest in bounded sequential batches.
//! Inserts that land after the scan are invisible to that run.

use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use shedstore::{ProgressionId, ProgressionRecord, ProgressionStore, Result as StoreResult};
use tracing::{debug, error, info};

use crate::score::quality_score;

/// Engine knobs.
///
/// `threshold` is accepted for interface compatibility but is not
/// consulted: matching is exact content-key equality only.
#[derive(Debug, Clone)]
pub struct DedupConfig {
    pub dry_run: bool,
    /// Maximum deletions per committed batch
    pub batch_size: usize,
    pub threshold: Option<f64>,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            batch_size: 500,
            threshold: None,
        }
    }
}

/// Keep/delete decision for one duplicate group
#[derive(Debug, Clone)]
pub struct GroupPlan {
    pub content_key: String,
    pub keep: ProgressionId,
    pub delete: Vec<ProgressionId>,
    /// Members with their resolved scores, best first
    pub members: Vec<(ProgressionId, f64)>,
}

/// Outcome of one dedup run. `aborted` carries the first batch-commit
/// error; everything committed before it is still counted.
#[derive(Debug, Clone, Default)]
pub struct DedupReport {
    pub scanned: usize,
    pub groups: Vec<GroupPlan>,
    pub planned_deletions: usize,
    pub deleted: usize,
    pub batches_committed: usize,
    pub aborted: Option<String>,
    pub dry_run: bool,
}

/// Deterministic identity of a progression's musical content: key, scale,
/// and the ordered chord names joined by "|". Case- and order-sensitive.
pub fn content_key(record: &ProgressionRecord) -> String {
    let mut parts = Vec::with_capacity(record.chords.len() + 2);
    parts.push(record.key.as_str());
    parts.push(record.scale.as_str());
    parts.extend(record.chords.iter().map(String::as_str));
    parts.join("|")
}

/// Run deduplication. The keep/delete plan is computed in full before any
/// deletion, so a dry run and a real run over the same snapshot select the
/// same retained id for every group.
pub fn run(store: &ProgressionStore, config: &DedupConfig) -> StoreResult<DedupReport> {
    if config.threshold.is_some() {
        debug!("threshold is set but matching uses exact content keys only");
    }

    let snapshot = store.list_progressions()?;
    let mut report = plan(&snapshot, config.dry_run);

    info!(
        scanned = report.scanned,
        groups = report.groups.len(),
        planned = report.planned_deletions,
        dry_run = config.dry_run,
        "dedup plan computed"
    );

    if config.dry_run {
        return Ok(report);
    }

    let delete_ids: Vec<String> = report
        .groups
        .iter()
        .flat_map(|group| group.delete.iter().map(|id| id.0.clone()))
        .collect();

    // sequential batches, never parallel, to bound write throughput
    for batch in delete_ids.chunks(config.batch_size.max(1)) {
        match store.delete_progressions(batch) {
            Ok(removed) => {
                report.deleted += removed;
                report.batches_committed += 1;
            }
            Err(e) => {
                error!(error = %e, "dedup batch commit failed, aborting remaining batches");
                report.aborted = Some(e.to_string());
                break;
            }
        }
    }

    Ok(report)
}

fn plan(snapshot: &[ProgressionRecord], dry_run: bool) -> DedupReport {
    // group by content key, remembering first-seen order
    let mut keys: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<&ProgressionRecord>> = HashMap::new();

    for record in snapshot {
        match groups.entry(content_key(record)) {
            Entry::Occupied(mut entry) => entry.get_mut().push(record),
            Entry::Vacant(entry) => {
                keys.push(entry.key().clone());
                entry.insert(vec![record]);
            }
        }
    }

    let mut report = DedupReport {
        scanned: snapshot.len(),
        dry_run,
        ..Default::default()
    };

    for key in keys {
        let members = &groups[&key];
        if members.len() < 2 {
            continue;
        }

        let mut scored: Vec<(ProgressionId, f64)> = members
            .iter()
            .map(|record| (record.id.clone(), quality_score(record)))
            .collect();
        // stable: ties keep scan order
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let keep = scored[0].0.clone();
        let delete: Vec<ProgressionId> = scored.iter().skip(1).map(|(id, _)| id.clone()).collect();
        report.planned_deletions += delete.len();
        report.groups.push(GroupPlan {
            content_key: key,
            keep,
            delete,
            members: scored,
        });
    }

    report
}
