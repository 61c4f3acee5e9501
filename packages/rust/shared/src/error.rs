//! Error types for Frontstage.
//!
//! Library crates use [`FrontstageError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Frontstage operations.
///
/// Each fatal variant names the stage that failed so the CLI message
/// identifies where the merge aborted.
#[derive(Debug, thiserror::Error)]
pub enum FrontstageError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Package manager spawn failure or non-zero exit. Raised before any
    /// network access is attempted.
    #[error("dependency install failed: {detail}")]
    Install { detail: String },

    /// Clone or local-tree acquisition failure (unreachable remote,
    /// timeout, bad source path).
    #[error("fetch failed: {detail}")]
    Fetch { detail: String },

    /// An allowlist entry does not exist in the fetched source tree.
    #[error("staging failed: allowlist entry '{entry}' not found in fetched source tree")]
    MissingEntry { entry: String },

    /// Filesystem-level failure while copying into the destination.
    #[error("staging failed: cannot copy {path:?}: {detail}")]
    Copy { path: PathBuf, detail: String },

    /// Scratch directory removal failure. Non-fatal to the merge: the
    /// destination is already correct once cleanup runs.
    #[error("cleanup failed: could not remove scratch directory {path:?}: {detail}")]
    Cleanup { path: PathBuf, detail: String },

    /// Filesystem I/O error outside the copy step.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (unsafe allowlist entry, digest mismatch,
    /// malformed report, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FrontstageError>;

impl FrontstageError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an install error from any displayable message.
    pub fn install(detail: impl Into<String>) -> Self {
        Self::Install {
            detail: detail.into(),
        }
    }

    /// Create a fetch error from any displayable message.
    pub fn fetch(detail: impl Into<String>) -> Self {
        Self::Fetch {
            detail: detail.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wrap a copy failure with the offending path.
    pub fn copy(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Copy {
            path: path.into(),
            detail: source.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_the_stage() {
        let err = FrontstageError::install("pip exited with status 1");
        assert!(err.to_string().starts_with("dependency install failed"));

        let err = FrontstageError::fetch("remote unreachable");
        assert!(err.to_string().starts_with("fetch failed"));

        let err = FrontstageError::MissingEntry {
            entry: "portal.css".into(),
        };
        assert!(err.to_string().contains("portal.css"));
        assert!(err.to_string().starts_with("staging failed"));
    }

    #[test]
    fn error_display_formatting() {
        let err = FrontstageError::config("allowlist is empty");
        assert_eq!(err.to_string(), "config error: allowlist is empty");

        let err = FrontstageError::validation("digest mismatch for index.html");
        assert!(err.to_string().contains("index.html"));
    }
}
