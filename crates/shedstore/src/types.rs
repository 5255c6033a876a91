use serde::{Deserialize, Serialize};

/// Unique identifier for a progression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgressionId(pub String);

impl ProgressionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for ProgressionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProgressionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a report
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(pub String);

impl ReportId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Regenerated,
    Dismissed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Regenerated => "regenerated",
            ReportStatus::Dismissed => "dismissed",
        }
    }
}

impl std::str::FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReportStatus::Pending),
            "regenerated" => Ok(ReportStatus::Regenerated),
            "dismissed" => Ok(ReportStatus::Dismissed),
            _ => Err(format!("unknown report status: {}", s)),
        }
    }
}

/// A persisted chord progression.
///
/// `numerals`, when present, is parallel to `chords` (same length, same
/// order). `quality_score` is only set when a scoring pass has written it
/// back; the scorer treats a preexisting value as authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionRecord {
    pub id: ProgressionId,
    pub key: String,
    pub scale: String,
    pub mood: String,
    pub style: String,
    pub chords: Vec<String>,
    pub numerals: Option<Vec<String>>,
    pub insights: Vec<String>,
    pub quality_score: Option<f64>,
    pub likes: i64,
    pub flags: i64,
    pub reported: bool,
    pub report_reason: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub regenerated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub regeneration_count: i64,
}

/// A user report against a progression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRecord {
    pub id: ReportId,
    pub progression_id: ProgressionId,
    pub reason: String,
    pub details: String,
    pub status: ReportStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub resolved_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Input for persisting a freshly generated progression
#[derive(Debug, Clone)]
pub struct NewProgression {
    pub key: String,
    pub scale: String,
    pub mood: String,
    pub style: String,
    pub chords: Vec<String>,
    pub numerals: Option<Vec<String>>,
    pub insights: Vec<String>,
}

/// Parse SQLite datetime string to chrono DateTime
/// Shared helper for all db operations
pub fn parse_datetime(s: &str) -> chrono::DateTime<chrono::Utc> {
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| chrono::Utc::now())
}
