//! Merge run reports.
//!
//! Builds the serializable [`MergeReport`] from a completed run and
//! writes it as pretty-printed JSON.

use std::path::Path;

use tracing::debug;

use frontstage_shared::{CURRENT_SCHEMA_VERSION, FrontstageError, MergeReport, Result};

use crate::pipeline::{MergeConfig, MergeOutcome};

/// Build a report from a completed merge run.
pub fn build_report(config: &MergeConfig, outcome: &MergeOutcome) -> MergeReport {
    MergeReport {
        schema_version: CURRENT_SCHEMA_VERSION,
        run_id: outcome.run_id.clone(),
        source: config.source.describe(),
        dest_dir: config.dest_dir.to_string_lossy().to_string(),
        tool_version: config.tool_version.clone(),
        started_at: outcome.started_at,
        elapsed_ms: outcome.elapsed.as_millis() as u64,
        entries: outcome.entries.clone(),
        files_copied: outcome.files_copied,
        bytes_copied: outcome.bytes_copied,
        cleanup_warning: outcome.cleanup_warning.clone(),
    }
}

/// Write a report as pretty-printed JSON.
pub fn write_report(path: &Path, report: &MergeReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).map_err(|e| {
        FrontstageError::validation(format!("report serialization failed: {e}"))
    })?;
    std::fs::write(path, json).map_err(|e| FrontstageError::io(path, e))?;
    debug!(path = %path.display(), "wrote merge report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SilentProgress;
    use frontstage_fetch::Source;
    use frontstage_shared::RunId;

    #[tokio::test]
    async fn report_roundtrips_through_disk() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        std::fs::write(src.path().join("index.html"), "<html></html>").unwrap();

        let config = MergeConfig {
            source: Source::Local {
                path: src.path().to_path_buf(),
            },
            allowlist: vec!["index.html".into()],
            dest_dir: dest.path().to_path_buf(),
            install: None,
            install_timeout: None,
            fetch_timeout: None,
            tool_version: "0.1.0-test".into(),
        };

        let outcome = crate::pipeline::merge_assets(&config, &SilentProgress)
            .await
            .unwrap();
        let report = build_report(&config, &outcome);

        let report_path = dest.path().join("merge-report.json");
        write_report(&report_path, &report).unwrap();

        let parsed: MergeReport =
            serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(parsed.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.files_copied, 1);
        assert!(parsed.source.starts_with("local "));

        let id: RunId = parsed.run_id;
        assert_eq!(id, outcome.run_id);
    }
}
