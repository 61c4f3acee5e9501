//! Source tree acquisition for Frontstage.
//!
//! A [`Source`] knows how to materialize the upstream frontend tree into a
//! scratch directory. Git sources shell out to the `git` binary via
//! `tokio::process::Command`; local sources copy a tree from disk, which is
//! how the pipeline is exercised against fixture trees in tests.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info};

use frontstage_shared::{FrontstageError, Result};

/// An acquirable source tree.
#[derive(Debug, Clone)]
pub enum Source {
    /// Remote git repository, cloned in full. No shallow or sparse
    /// options: the upstream layout is not guaranteed to support them.
    Git {
        /// HTTPS clone URL.
        url: String,
        /// Branch or tag; `None` uses the remote default.
        reference: Option<String>,
    },
    /// A tree already on disk, copied verbatim. Used for fixture-based
    /// testing and for air-gapped staging from a checkout.
    Local {
        /// Root of the source tree.
        path: PathBuf,
    },
}

impl Source {
    /// Human-readable description for logs and reports.
    pub fn describe(&self) -> String {
        match self {
            Self::Git { url, reference } => match reference {
                Some(r) => format!("git {url} ({r})"),
                None => format!("git {url}"),
            },
            Self::Local { path } => format!("local {}", path.display()),
        }
    }

    /// Materialize the full source tree into `dest`.
    ///
    /// `dest` must be an existing, empty directory (the scratch dir). On
    /// failure nothing outside `dest` has been touched.
    pub async fn fetch_into(&self, dest: &Path, timeout: Option<Duration>) -> Result<()> {
        match self {
            Self::Git { url, reference } => {
                clone_git(url, reference.as_deref(), dest, timeout).await
            }
            Self::Local { path } => copy_local(path, dest),
        }
    }
}

// ---------------------------------------------------------------------------
// Git
// ---------------------------------------------------------------------------

/// Build the argument vector for a full clone into `dest`.
fn git_clone_args(url: &str, reference: Option<&str>, dest: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["clone".into()];
    if let Some(r) = reference {
        args.push("--branch".into());
        args.push(r.into());
    }
    args.push(url.into());
    args.push(dest.as_os_str().to_owned());
    args
}

async fn clone_git(
    url: &str,
    reference: Option<&str>,
    dest: &Path,
    timeout: Option<Duration>,
) -> Result<()> {
    let args = git_clone_args(url, reference, dest);

    info!(url, reference = reference.unwrap_or("<default>"), "cloning source tree");

    let child = Command::new("git")
        .args(&args)
        // Credential prompts would hang the build; fail fast instead.
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| FrontstageError::fetch(format!("cannot spawn git: {e}")))?;

    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| {
                FrontstageError::fetch(format!(
                    "git clone of {url} timed out after {}s",
                    limit.as_secs()
                ))
            })?,
        None => child.wait_with_output().await,
    }
    .map_err(|e| FrontstageError::fetch(format!("git clone of {url}: {e}")))?;

    if !output.status.success() {
        return Err(FrontstageError::fetch(format!(
            "git clone of {url} exited with {}: {}",
            output.status,
            stderr_tail(&output.stderr)
        )));
    }

    debug!(dest = %dest.display(), "clone complete");
    Ok(())
}

/// Last few lines of captured stderr, for error messages.
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let tail_start = lines.len().saturating_sub(4);
    lines[tail_start..].join(" | ")
}

// ---------------------------------------------------------------------------
// Local
// ---------------------------------------------------------------------------

fn copy_local(src: &Path, dest: &Path) -> Result<()> {
    if !src.is_dir() {
        return Err(FrontstageError::fetch(format!(
            "local source '{}' is not a directory",
            src.display()
        )));
    }

    info!(src = %src.display(), "copying local source tree");

    let mut files = 0usize;
    for entry in walkdir::WalkDir::new(src) {
        let entry = entry
            .map_err(|e| FrontstageError::fetch(format!("walking {}: {e}", src.display())))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .expect("walkdir yields paths under its root");
        if rel.as_os_str().is_empty() {
            continue;
        }

        let target = dest.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| FrontstageError::io(&target, e))?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| FrontstageError::io(parent, e))?;
            }
            std::fs::copy(entry.path(), &target)
                .map_err(|e| FrontstageError::io(entry.path(), e))?;
            files += 1;
        }
    }

    debug!(files, dest = %dest.display(), "local copy complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_args_without_reference() {
        let args = git_clone_args(
            "https://git.example.com/frontend.git",
            None,
            Path::new("/tmp/scratch"),
        );
        assert_eq!(args[0], "clone");
        assert_eq!(args[1], "https://git.example.com/frontend.git");
        assert_eq!(args[2], "/tmp/scratch");
        // Full clone: never shallow or sparse.
        assert!(!args.iter().any(|a| a == "--depth"));
    }

    #[test]
    fn clone_args_with_reference() {
        let args = git_clone_args(
            "https://git.example.com/frontend.git",
            Some("release"),
            Path::new("/tmp/scratch"),
        );
        assert_eq!(args[0], "clone");
        assert_eq!(args[1], "--branch");
        assert_eq!(args[2], "release");
    }

    #[test]
    fn describe_formats() {
        let git = Source::Git {
            url: "https://git.example.com/frontend.git".into(),
            reference: Some("main".into()),
        };
        assert_eq!(git.describe(), "git https://git.example.com/frontend.git (main)");

        let local = Source::Local {
            path: PathBuf::from("/fixtures/frontend"),
        };
        assert_eq!(local.describe(), "local /fixtures/frontend");
    }

    #[test]
    fn stderr_tail_keeps_last_lines() {
        let noise = b"line1\nline2\n\nline3\nline4\nfatal: repository not found\n";
        let tail = stderr_tail(noise);
        assert!(tail.contains("fatal: repository not found"));
        assert!(!tail.contains("line1"));
    }

    #[tokio::test]
    async fn local_fetch_copies_nested_tree() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();

        std::fs::write(src.path().join("index.html"), "<html></html>").unwrap();
        std::fs::create_dir_all(src.path().join("assets/img")).unwrap();
        std::fs::write(src.path().join("assets/img/logo.svg"), "<svg/>").unwrap();

        let source = Source::Local {
            path: src.path().to_path_buf(),
        };
        source.fetch_into(dest.path(), None).await.unwrap();

        assert!(dest.path().join("index.html").exists());
        let logo = std::fs::read_to_string(dest.path().join("assets/img/logo.svg")).unwrap();
        assert_eq!(logo, "<svg/>");
    }

    #[tokio::test]
    async fn local_fetch_missing_source_fails() {
        let dest = tempfile::tempdir().unwrap();
        let source = Source::Local {
            path: PathBuf::from("/nonexistent/frontend-tree"),
        };

        let err = source.fetch_into(dest.path(), None).await.unwrap_err();
        assert!(err.to_string().starts_with("fetch failed"));

        // Destination stays empty on fetch failure.
        assert_eq!(std::fs::read_dir(dest.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn git_fetch_unreachable_remote_fails() {
        let dest = tempfile::tempdir().unwrap();
        let source = Source::Git {
            url: "file:///nonexistent/frontstage-no-such-repo.git".into(),
            reference: None,
        };

        let err = source
            .fetch_into(dest.path(), Some(Duration::from_secs(30)))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("fetch failed"));
    }
}
