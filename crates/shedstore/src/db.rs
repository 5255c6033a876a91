use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use crate::types::*;
use crate::{Result, StoreError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS progressions (
    id TEXT PRIMARY KEY,
    key_name TEXT NOT NULL,
    scale TEXT NOT NULL,
    mood TEXT NOT NULL,
    style TEXT NOT NULL,
    chords JSON NOT NULL,
    numerals JSON,
    insights JSON NOT NULL,
    quality_score REAL,
    likes INTEGER NOT NULL DEFAULT 0,
    flags INTEGER NOT NULL DEFAULT 0,
    reported BOOLEAN NOT NULL DEFAULT FALSE,
    report_reason TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    regenerated_at TEXT,
    regeneration_count INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS reports (
    id TEXT PRIMARY KEY,
    progression_id TEXT NOT NULL REFERENCES progressions(id) ON DELETE CASCADE,
    reason TEXT NOT NULL,
    details TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'pending',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    resolved_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_reports_status ON reports(status, created_at);
CREATE INDEX IF NOT EXISTS idx_reports_progression ON reports(progression_id);
"#;

const PROGRESSION_COLUMNS: &str = "id, key_name, scale, mood, style, chords, numerals, insights, \
     quality_score, likes, flags, reported, report_reason, created_at, regenerated_at, \
     regeneration_count";

const REPORT_COLUMNS: &str =
    "id, progression_id, reason, details, status, created_at, resolved_at";

/// Store for progressions and reports with connection-per-call pattern.
/// Each method creates a fresh connection with WAL mode enabled.
pub struct ProgressionStore {
    path: PathBuf,
}

impl ProgressionStore {
    /// Open store at path, creating if necessary
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let store = Self { path };
        store.initialize()?;
        Ok(store)
    }

    /// Create a temporary database file with a unique name.
    /// Each call creates a new database - suitable for tests.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let temp_dir = std::env::temp_dir();
        let unique_id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("shedstore_{}_{}.db", std::process::id(), unique_id);
        Self::open(temp_dir.join(db_name))
    }

    /// Get a connection with WAL mode and busy timeout
    pub fn conn(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA busy_timeout = 5000;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        Ok(conn)
    }

    fn initialize(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Persist a freshly generated progression
    pub fn insert_progression(&self, new: NewProgression) -> Result<ProgressionRecord> {
        let id = ProgressionId::new();
        let chords = serde_json::to_string(&new.chords)?;
        let numerals = new
            .numerals
            .as_ref()
            .map(|n| serde_json::to_string(n))
            .transpose()?;
        let insights = serde_json::to_string(&new.insights)?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO progressions (id, key_name, scale, mood, style, chords, numerals, insights)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            (
                &id.0, &new.key, &new.scale, &new.mood, &new.style, &chords, &numerals, &insights,
            ),
        )?;

        self.get_progression(&id.0)?
            .ok_or_else(|| StoreError::MissingProgression(id.0.clone()))
    }

    /// Get a progression by ID
    pub fn get_progression(&self, id: &str) -> Result<Option<ProgressionRecord>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM progressions WHERE id = ?1",
            PROGRESSION_COLUMNS
        ))?;

        let result = stmt.query_row([id], row_to_progression);

        match result {
            Ok(rec) => Ok(Some(rec)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Full corpus snapshot in insertion order. The deduplication engine
    /// relies on this order being stable within one scan.
    pub fn list_progressions(&self) -> Result<Vec<ProgressionRecord>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM progressions ORDER BY rowid ASC",
            PROGRESSION_COLUMNS
        ))?;

        let rows = stmt.query_map([], row_to_progression)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    pub fn count_progressions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM progressions", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete a batch of progressions in one transaction.
    /// Returns the number of rows actually removed.
    pub fn delete_progressions(&self, ids: &[String]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let mut deleted = 0;
        {
            let mut stmt = tx.prepare("DELETE FROM progressions WHERE id = ?1")?;
            for id in ids {
                deleted += stmt.execute([id])?;
            }
        }

        tx.commit()?;
        debug!(requested = ids.len(), deleted, "deleted progression batch");
        Ok(deleted)
    }

    /// Field-increment for the likes counter
    pub fn increment_likes(&self, id: &str) -> Result<()> {
        let conn = self.conn()?;
        let rows = conn.execute(
            "UPDATE progressions SET likes = likes + 1 WHERE id = ?1",
            [id],
        )?;
        if rows == 0 {
            return Err(StoreError::MissingProgression(id.to_string()));
        }
        Ok(())
    }

    /// Report intake: insert a pending report and mark the progression
    /// (flags++, reported, reason) in one transaction.
    pub fn file_report(
        &self,
        progression_id: &str,
        reason: &str,
        details: &str,
    ) -> Result<ReportRecord> {
        let id = ReportId::new();
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let rows = tx.execute(
            "UPDATE progressions
             SET flags = flags + 1, reported = TRUE, report_reason = ?2
             WHERE id = ?1",
            (progression_id, reason),
        )?;
        if rows == 0 {
            return Err(StoreError::MissingProgression(progression_id.to_string()));
        }

        tx.execute(
            "INSERT INTO reports (id, progression_id, reason, details) VALUES (?1, ?2, ?3, ?4)",
            (&id.0, progression_id, reason, details),
        )?;

        tx.commit()?;

        self.get_report(&id.0)?
            .ok_or_else(|| StoreError::MissingProgression(id.0.clone()))
    }

    /// Get a report by ID
    pub fn get_report(&self, id: &str) -> Result<Option<ReportRecord>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM reports WHERE id = ?1",
            REPORT_COLUMNS
        ))?;

        let result = stmt.query_row([id], row_to_report);

        match result {
            Ok(rec) => Ok(Some(rec)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All reports with status=pending, oldest first
    pub fn pending_reports(&self) -> Result<Vec<ReportRecord>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM reports WHERE status = 'pending' ORDER BY created_at ASC, rowid ASC",
            REPORT_COLUMNS
        ))?;

        let rows = stmt.query_map([], row_to_report)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// All reports against one progression, oldest first
    pub fn reports_for(&self, progression_id: &str) -> Result<Vec<ReportRecord>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM reports WHERE progression_id = ?1 ORDER BY created_at ASC, rowid ASC",
            REPORT_COLUMNS
        ))?;

        let rows = stmt.query_map([progression_id], row_to_report)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Commit one regeneration group: overwrite the progression's content,
    /// clear its reported state, bump regeneration_count by exactly 1, and
    /// resolve every report in the group - all in a single transaction.
    pub fn apply_regeneration(
        &self,
        progression_id: &str,
        chords: &[String],
        numerals: Option<&[String]>,
        insights: &[String],
        report_ids: &[ReportId],
    ) -> Result<()> {
        let chords_json = serde_json::to_string(chords)?;
        let numerals_json = numerals.map(serde_json::to_string).transpose()?;
        let insights_json = serde_json::to_string(insights)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let rows = tx.execute(
            "UPDATE progressions
             SET chords = ?2, numerals = ?3, insights = ?4,
                 reported = FALSE, report_reason = NULL,
                 regenerated_at = datetime('now'),
                 regeneration_count = regeneration_count + 1
             WHERE id = ?1",
            (progression_id, &chords_json, &numerals_json, &insights_json),
        )?;
        if rows == 0 {
            return Err(StoreError::MissingProgression(progression_id.to_string()));
        }

        {
            let mut stmt = tx.prepare(
                "UPDATE reports SET status = 'regenerated', resolved_at = datetime('now')
                 WHERE id = ?1",
            )?;
            for report_id in report_ids {
                stmt.execute([&report_id.0])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Drop every progression (reports cascade)
    pub fn clear_progressions(&self) -> Result<usize> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM progressions", [])?;
        Ok(rows)
    }

    /// Drop every report, leaving progressions untouched
    pub fn clear_reports(&self) -> Result<usize> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM reports", [])?;
        Ok(rows)
    }
}

fn row_to_progression(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProgressionRecord> {
    let chords: String = row.get(5)?;
    let numerals: Option<String> = row.get(6)?;
    let insights: String = row.get(7)?;

    Ok(ProgressionRecord {
        id: ProgressionId(row.get(0)?),
        key: row.get(1)?,
        scale: row.get(2)?,
        mood: row.get(3)?,
        style: row.get(4)?,
        chords: serde_json::from_str(&chords).unwrap_or_default(),
        numerals: numerals.and_then(|n| serde_json::from_str(&n).ok()),
        insights: serde_json::from_str(&insights).unwrap_or_default(),
        quality_score: row.get(8)?,
        likes: row.get(9)?,
        flags: row.get(10)?,
        reported: row.get(11)?,
        report_reason: row.get(12)?,
        created_at: parse_datetime(&row.get::<_, String>(13)?),
        regenerated_at: row
            .get::<_, Option<String>>(14)?
            .map(|s| parse_datetime(&s)),
        regeneration_count: row.get(15)?,
    })
}

fn row_to_report(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReportRecord> {
    Ok(ReportRecord {
        id: ReportId(row.get(0)?),
        progression_id: ProgressionId(row.get(1)?),
        reason: row.get(2)?,
        details: row.get(3)?,
        status: row
            .get::<_, String>(4)?
            .parse()
            .unwrap_or(ReportStatus::Pending),
        created_at: parse_datetime(&row.get::<_, String>(5)?),
        resolved_at: row
            .get::<_, Option<String>>(6)?
            .map(|s| parse_datetime(&s)),
    })
}
