//! Allowlist staging: validated, ordered copy from the fetched tree into
//! the destination, then digest verification of everything staged.

use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, info};
use walkdir::WalkDir;

use frontstage_shared::{EntryReport, FrontstageError, Result, validate_allowlist_entry};

/// Copy every allowlist entry from `src_root` into `dest`, overwriting
/// existing entries of the same name.
///
/// All entries are validated (path safety + existence in the fetched
/// tree) before the first byte is copied, so a missing entry leaves the
/// destination untouched. Copy order follows allowlist order.
pub fn stage_entries(
    src_root: &Path,
    dest: &Path,
    allowlist: &[String],
) -> Result<Vec<EntryReport>> {
    let entries = validate_entries(src_root, allowlist)?;

    std::fs::create_dir_all(dest).map_err(|e| FrontstageError::io(dest, e))?;

    let mut reports = Vec::with_capacity(entries.len());
    for entry in &entries {
        let src = src_root.join(entry);
        let target = dest.join(entry);

        let (files, bytes) = if src.is_dir() {
            copy_tree(&src, &target)?
        } else {
            copy_file(&src, &target)?
        };

        debug!(entry = %entry, files, bytes, "staged entry");
        reports.push(EntryReport {
            entry: entry.clone(),
            files,
            bytes,
        });
    }

    info!(
        entries = reports.len(),
        files = reports.iter().map(|r| r.files).sum::<usize>(),
        "staging complete"
    );

    Ok(reports)
}

/// Normalize and validate the allowlist against the fetched tree.
///
/// Returns normalized entries (trailing slashes trimmed). The first
/// missing entry aborts the whole staging step.
fn validate_entries(src_root: &Path, allowlist: &[String]) -> Result<Vec<String>> {
    let mut normalized = Vec::with_capacity(allowlist.len());

    for raw in allowlist {
        validate_allowlist_entry(raw)?;
        let entry = raw.trim_end_matches('/').to_string();

        let src = src_root.join(&entry);
        if !src.exists() {
            return Err(FrontstageError::MissingEntry { entry });
        }
        normalized.push(entry);
    }

    Ok(normalized)
}

/// Copy a single file, creating parent directories as needed.
fn copy_file(src: &Path, target: &Path) -> Result<(usize, u64)> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|e| FrontstageError::io(parent, e))?;
    }
    let bytes = std::fs::copy(src, target).map_err(|e| FrontstageError::copy(src, e))?;
    Ok((1, bytes))
}

/// Recursively copy a directory tree, overwriting existing files.
fn copy_tree(src: &Path, target: &Path) -> Result<(usize, u64)> {
    let mut files = 0usize;
    let mut bytes = 0u64;

    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| FrontstageError::Copy {
            path: src.to_path_buf(),
            detail: e.to_string(),
        })?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .expect("walkdir yields paths under its root");

        let dest_path = target.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest_path)
                .map_err(|e| FrontstageError::io(&dest_path, e))?;
        } else {
            if let Some(parent) = dest_path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| FrontstageError::io(parent, e))?;
            }
            bytes += std::fs::copy(entry.path(), &dest_path)
                .map_err(|e| FrontstageError::copy(entry.path(), e))?;
            files += 1;
        }
    }

    Ok((files, bytes))
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verify that every staged file is byte-identical to the fetched tree,
/// by SHA-256 digest comparison.
pub fn verify_entries(src_root: &Path, dest: &Path, allowlist: &[String]) -> Result<()> {
    let mut checked = 0usize;

    for raw in allowlist {
        let entry = raw.trim_end_matches('/');
        let src = src_root.join(entry);

        if src.is_dir() {
            for walked in WalkDir::new(&src) {
                let walked = walked.map_err(|e| {
                    FrontstageError::validation(format!("verify walk of {entry}: {e}"))
                })?;
                if !walked.file_type().is_file() {
                    continue;
                }
                let rel = walked
                    .path()
                    .strip_prefix(src_root)
                    .expect("walkdir yields paths under src_root");
                verify_file(walked.path(), &dest.join(rel))?;
                checked += 1;
            }
        } else {
            verify_file(&src, &dest.join(entry))?;
            checked += 1;
        }
    }

    debug!(files = checked, "digest verification passed");
    Ok(())
}

fn verify_file(src: &Path, staged: &Path) -> Result<()> {
    let expected = file_digest(src)?;
    let actual = file_digest(staged)?;
    if expected != actual {
        return Err(FrontstageError::validation(format!(
            "digest mismatch for staged file {}",
            staged.display()
        )));
    }
    Ok(())
}

/// SHA-256 hex digest of a file's contents.
pub fn file_digest(path: &Path) -> Result<String> {
    let content = std::fs::read(path).map_err(|e| FrontstageError::io(path, e))?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(format!("{:x}", hasher.finalize()))
}
