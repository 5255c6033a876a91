//! Corpus curation for Woodshed.
//!
//! Three batch-side concerns over the persisted progression corpus:
//! heuristic quality scoring, content-keyed deduplication, and
//! regeneration of reported progressions. Everything here is sequential
//! within a run; safety across concurrent generation requests comes from
//! statelessness, not locks.

pub mod dedup;
pub mod regen;
pub mod score;

pub use dedup::{content_key, DedupConfig, DedupReport, GroupPlan};
pub use regen::RegenReport;
pub use score::quality_score;
