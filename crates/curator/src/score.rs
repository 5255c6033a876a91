//! Heuristic quality scoring.
//!
//! A pure function from a progression record to a score in [0, 100],
//! used by the deduplication engine to decide which duplicate survives.
//! Records that already carry a score are passed through unchanged;
//! scoring only computes for scoreless records.
//!
//! Structural issues are penalized twice: once with an issue-specific
//! deduction and again with a flat per-issue deduction. That double
//! counting is intentional business logic, pinned by the tests below -
//! do not fold the two together.

use shedstore::ProgressionRecord;

const CHORD_FLOOR: usize = 4;
const INSIGHT_FLOOR: usize = 3;
const INSIGHT_CHAR_FLOOR: usize = 100;

/// Score a progression. Idempotent over stored scores: a preexisting
/// `quality_score` is returned as-is.
pub fn quality_score(record: &ProgressionRecord) -> f64 {
    if let Some(score) = record.quality_score {
        return score;
    }

    let mut score = 100.0;
    let mut issues = 0;

    if record.chords.len() < CHORD_FLOOR {
        score -= 20.0;
        issues += 1;
    }
    if record.insights.len() < INSIGHT_FLOOR {
        score -= 20.0;
        issues += 1;
    }
    if record
        .insights
        .iter()
        .any(|insight| insight.chars().count() < INSIGHT_CHAR_FLOOR)
    {
        score -= 15.0;
        issues += 1;
    }
    // flat per-issue deduction on top of the specific ones
    score -= 5.0 * issues as f64;

    if record.chords.len() > 8 {
        score += (((record.chords.len() - 8) * 2) as f64).min(10.0);
    }
    if record.insights.len() > 3 {
        score += (((record.insights.len() - 3) * 3) as f64).min(10.0);
    }
    if !record.insights.is_empty() {
        let total: usize = record.insights.iter().map(|i| i.chars().count()).sum();
        let avg = total as f64 / record.insights.len() as f64;
        if avg > 150.0 {
            score += ((avg - 150.0) / 10.0).min(10.0);
        }
    }

    if record.reported {
        score -= 30.0;
    }
    score -= (5.0 * record.flags as f64).min(20.0);
    score += (2.0 * record.likes as f64).min(20.0);

    score.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shedstore::{ProgressionId, ProgressionRecord};

    fn record(chords: usize, insights: usize, insight_len: usize) -> ProgressionRecord {
        ProgressionRecord {
            id: ProgressionId::new(),
            key: "C".to_string(),
            scale: "major".to_string(),
            mood: "happy".to_string(),
            style: "pop".to_string(),
            chords: (0..chords).map(|_| "C".to_string()).collect(),
            numerals: None,
            insights: (0..insights).map(|_| "x".repeat(insight_len)).collect(),
            quality_score: None,
            likes: 0,
            flags: 0,
            reported: false,
            report_reason: None,
            created_at: chrono::Utc::now(),
            regenerated_at: None,
            regeneration_count: 0,
        }
    }

    #[test]
    fn stored_score_is_passed_through() {
        let mut rec = record(1, 0, 0); // would score terribly
        rec.quality_score = Some(55.5);
        assert_eq!(quality_score(&rec), 55.5);
    }

    #[test]
    fn clean_record_scores_full_marks() {
        assert_eq!(quality_score(&record(4, 3, 100)), 100.0);
    }

    #[test]
    fn each_issue_is_double_penalized() {
        // one issue: 100 - 20 (short chords) - 5 (flat) = 75
        assert_eq!(quality_score(&record(3, 3, 100)), 75.0);
        // two issues: 100 - 20 - 20 - 10 = 50
        assert_eq!(quality_score(&record(3, 2, 100)), 50.0);
        // all three: 100 - 20 - 20 - 15 - 15 = 30
        assert_eq!(quality_score(&record(3, 2, 50)), 30.0);
    }

    #[test]
    fn chord_bonus_caps_at_ten() {
        assert_eq!(quality_score(&record(9, 3, 100)), 100.0); // already clamped
        let mut rec = record(20, 3, 100);
        rec.reported = true; // pull the base down so the bonus is visible
        // 100 + 10 (capped chord bonus) - 30 = 80
        assert_eq!(quality_score(&rec), 80.0);
    }

    #[test]
    fn insight_bonuses_cap_at_ten_each() {
        let mut rec = record(4, 8, 200);
        rec.reported = true;
        // 100 + 10 (insight count, capped) + 5 (avg length 200) - 30 = 85
        assert_eq!(quality_score(&rec), 85.0);

        let mut rec = record(4, 3, 400);
        rec.reported = true;
        // 100 + 10 (avg length bonus capped) - 30 = 80
        assert_eq!(quality_score(&rec), 80.0);
    }

    #[test]
    fn reported_and_flags_penalize() {
        let mut rec = record(4, 3, 100);
        rec.reported = true;
        assert_eq!(quality_score(&rec), 70.0);

        rec.flags = 2;
        assert_eq!(quality_score(&rec), 60.0);

        rec.flags = 100; // capped at -20
        assert_eq!(quality_score(&rec), 50.0);
    }

    #[test]
    fn likes_bonus_caps_at_twenty() {
        let mut rec = record(3, 2, 50); // base 30
        rec.likes = 3;
        assert_eq!(quality_score(&rec), 36.0);
        rec.likes = 1000;
        assert_eq!(quality_score(&rec), 50.0);
    }

    #[test]
    fn result_is_always_clamped() {
        let mut rec = record(1, 1, 5);
        rec.reported = true;
        rec.flags = 50;
        assert_eq!(quality_score(&rec), 0.0);

        let mut rec = record(20, 8, 500);
        rec.likes = 1000;
        assert_eq!(quality_score(&rec), 100.0);
    }
}
