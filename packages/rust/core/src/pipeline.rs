//! End-to-end merge pipeline: install → scratch → fetch → stage → teardown.
//!
//! The four steps form a strict total order with short-circuit on the
//! first fatal error. The scratch directory is scoped to this function:
//! explicit teardown on success, drop-based removal on every failure path.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{info, instrument, warn};

use frontstage_fetch::Source;
use frontstage_shared::{EntryReport, Result, RunId};
use frontstage_staging::{Scratch, stage_entries, verify_entries};

use crate::install::{InstallSpec, install_dependencies};

/// Configuration for a single merge run.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Where the frontend tree comes from.
    pub source: Source,
    /// Ordered relative paths to stage from the fetched tree.
    pub allowlist: Vec<String>,
    /// Destination directory receiving the staged assets.
    pub dest_dir: PathBuf,
    /// Package manager invocation; `None` skips the install step.
    pub install: Option<InstallSpec>,
    /// Timeout for the install step.
    pub install_timeout: Option<Duration>,
    /// Timeout for the fetch step.
    pub fetch_timeout: Option<Duration>,
    /// Tool version string, recorded on the outcome.
    pub tool_version: String,
}

/// Result of a completed merge run.
#[derive(Debug)]
pub struct MergeOutcome {
    /// Unique run identifier.
    pub run_id: RunId,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Per-entry staging results, in allowlist order.
    pub entries: Vec<EntryReport>,
    /// Total files copied.
    pub files_copied: usize,
    /// Total bytes copied.
    pub bytes_copied: u64,
    /// Total elapsed time.
    pub elapsed: Duration,
    /// Set when scratch teardown failed. The merge still succeeded: the
    /// destination is already correct by teardown time.
    pub cleanup_warning: Option<String>,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each allowlist entry is staged.
    fn entry_staged(&self, entry: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, outcome: &MergeOutcome);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn entry_staged(&self, _entry: &str, _current: usize, _total: usize) {}
    fn done(&self, _outcome: &MergeOutcome) {}
}

/// Run the full merge step.
///
/// 1. Install backend dependencies (before any network I/O)
/// 2. Acquire a unique scratch directory
/// 3. Fetch the source tree into it
/// 4. Stage the allowlist into the destination, then verify digests
/// 5. Tear the scratch directory down (non-fatal on failure)
#[instrument(skip_all, fields(source = %config.source.describe(), dest = %config.dest_dir.display()))]
pub async fn merge_assets(
    config: &MergeConfig,
    progress: &dyn ProgressReporter,
) -> Result<MergeOutcome> {
    let start = Instant::now();
    let started_at = Utc::now();
    let run_id = RunId::new();

    info!(%run_id, "starting merge run");

    // --- Step 1: dependency install ---
    if let Some(install) = &config.install {
        progress.phase("Installing dependencies");
        install_dependencies(install, config.install_timeout).await?;
    } else {
        info!("dependency install disabled, skipping");
    }

    // --- Step 2: scratch acquisition ---
    progress.phase("Preparing scratch directory");
    let scratch = Scratch::new()?;

    // --- Step 3: fetch ---
    // From here until teardown, any `?` drops `scratch` and removes the
    // clone along with it.
    progress.phase("Fetching source tree");
    config
        .source
        .fetch_into(scratch.path(), config.fetch_timeout)
        .await?;

    // --- Step 4: staging + verification ---
    progress.phase("Staging assets");
    let entries = stage_entries(scratch.path(), &config.dest_dir, &config.allowlist)?;
    let total = entries.len();
    for (i, report) in entries.iter().enumerate() {
        progress.entry_staged(&report.entry, i + 1, total);
    }

    progress.phase("Verifying staged assets");
    verify_entries(scratch.path(), &config.dest_dir, &config.allowlist)?;

    // --- Step 5: scratch teardown ---
    progress.phase("Removing scratch directory");
    let cleanup_warning = match scratch.close() {
        Ok(()) => None,
        Err(e) => {
            warn!(error = %e, "scratch teardown failed");
            Some(e.to_string())
        }
    };

    let outcome = MergeOutcome {
        run_id,
        started_at,
        files_copied: entries.iter().map(|r| r.files).sum(),
        bytes_copied: entries.iter().map(|r| r.bytes).sum(),
        entries,
        elapsed: start.elapsed(),
        cleanup_warning,
    };

    progress.done(&outcome);

    info!(
        run_id = %outcome.run_id,
        entries = outcome.entries.len(),
        files = outcome.files_copied,
        bytes = outcome.bytes_copied,
        elapsed_ms = outcome.elapsed.as_millis(),
        "merge run complete"
    );

    Ok(outcome)
}
