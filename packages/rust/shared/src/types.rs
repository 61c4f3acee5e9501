//! Core domain types for Frontstage merge runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current schema version for the merge report format.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for merge run identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// EntryReport
// ---------------------------------------------------------------------------

/// Per-allowlist-entry staging result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryReport {
    /// The allowlist entry, as configured (normalized, no trailing slash).
    pub entry: String,
    /// Number of files copied for this entry (1 for a plain file).
    pub files: usize,
    /// Total bytes copied for this entry.
    pub bytes: u64,
}

// ---------------------------------------------------------------------------
// MergeReport
// ---------------------------------------------------------------------------

/// Serializable record of a completed merge run, written as JSON when the
/// CLI is asked for a report file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeReport {
    /// Schema version for forward compatibility.
    pub schema_version: u32,
    /// Unique identifier for this run.
    pub run_id: RunId,
    /// Human-readable description of the source that was fetched.
    pub source: String,
    /// Destination directory the assets were staged into.
    pub dest_dir: String,
    /// Tool version that produced this report.
    pub tool_version: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration in milliseconds.
    pub elapsed_ms: u64,
    /// Per-entry staging results, in allowlist order.
    pub entries: Vec<EntryReport>,
    /// Total files copied across all entries.
    pub files_copied: usize,
    /// Total bytes copied across all entries.
    pub bytes_copied: u64,
    /// Set when scratch teardown failed (non-fatal).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleanup_warning: Option<String>,
}
