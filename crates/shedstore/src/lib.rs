//! SQLite-backed persistence for Woodshed.
//!
//! Two collections: `progressions` (the generated corpus) and `reports`
//! (user reports against progressions). Multi-record mutations - batched
//! deletions, per-group regeneration commits, report intake - are single
//! transactions so callers get all-or-nothing semantics per batch.

pub mod db;
pub mod types;

pub use db::ProgressionStore;
pub use types::{
    parse_datetime, NewProgression, ProgressionId, ProgressionRecord, ReportId, ReportRecord,
    ReportStatus,
};

use thiserror::Error;

/// Persistence faults. These are surfaced to the caller, never swallowed:
/// batch jobs abort remaining work and report partial progress.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to encode record field: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no progression with id {0}")]
    MissingProgression(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
