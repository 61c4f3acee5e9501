//! Scratch directory lifecycle.
//!
//! Every merge run gets a unique temporary directory, so concurrent
//! invocations never race on a shared well-known path. The directory is
//! removed explicitly via [`Scratch::close`] on the success path and
//! best-effort on drop for every early-exit path.

use std::path::Path;

use tempfile::TempDir;
use tracing::debug;

use frontstage_shared::{FrontstageError, Result};

/// An owned, uniquely-named temporary directory for the fetched tree.
#[derive(Debug)]
pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    /// Allocate a fresh scratch directory under the system temp location.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("frontstage-scratch-")
            .tempdir()
            .map_err(|e| {
                FrontstageError::io(std::env::temp_dir(), e)
            })?;
        debug!(path = %dir.path().display(), "scratch directory created");
        Ok(Self { dir })
    }

    /// Path to the scratch root.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the scratch directory, reporting failure as [`FrontstageError::Cleanup`].
    ///
    /// Dropping a `Scratch` removes the directory too, but silently; the
    /// pipeline calls `close` so removal failures surface as warnings.
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close().map_err(|e| FrontstageError::Cleanup {
            path,
            detail: e.to_string(),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_removes_directory() {
        let scratch = Scratch::new().unwrap();
        let path = scratch.path().to_path_buf();
        assert!(path.is_dir());

        scratch.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn drop_removes_directory() {
        let path = {
            let scratch = Scratch::new().unwrap();
            std::fs::write(scratch.path().join("clone-marker"), "x").unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn scratch_paths_are_unique() {
        let a = Scratch::new().unwrap();
        let b = Scratch::new().unwrap();
        assert_ne!(a.path(), b.path());
    }
}
