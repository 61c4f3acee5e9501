//! Backend dependency installation.
//!
//! The package manager is an external collaborator: Frontstage invokes it
//! once, synchronously, and treats any failure as fatal before the fetch
//! step runs. Dependency resolution itself is entirely the package
//! manager's business.

use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info};

use frontstage_shared::{FrontstageError, Result};

/// Resolved package manager invocation.
#[derive(Debug, Clone)]
pub struct InstallSpec {
    /// Executable name or path (e.g. `pip`).
    pub command: String,
    /// Arguments, including the dependency manifest (e.g.
    /// `install -r requirements.txt`).
    pub args: Vec<String>,
}

/// Run the package manager and wait for it to finish.
///
/// Non-zero exit or spawn failure maps to [`FrontstageError::Install`];
/// the last lines of stderr are embedded in the message.
pub async fn install_dependencies(
    spec: &InstallSpec,
    timeout: Option<Duration>,
) -> Result<()> {
    info!(command = %spec.command, args = ?spec.args, "installing dependencies");

    let child = Command::new(&spec.command)
        .args(&spec.args)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            FrontstageError::install(format!("cannot spawn '{}': {e}", spec.command))
        })?;

    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| {
                FrontstageError::install(format!(
                    "'{}' timed out after {}s",
                    spec.command,
                    limit.as_secs()
                ))
            })?,
        None => child.wait_with_output().await,
    }
    .map_err(|e| FrontstageError::install(format!("waiting for '{}': {e}", spec.command)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let tail: Vec<&str> = stderr
            .lines()
            .filter(|l| !l.trim().is_empty())
            .rev()
            .take(4)
            .collect();
        let tail: Vec<&str> = tail.into_iter().rev().collect();
        return Err(FrontstageError::install(format!(
            "'{}' exited with {}: {}",
            spec.command,
            output.status,
            tail.join(" | ")
        )));
    }

    debug!(command = %spec.command, "dependency install complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn successful_install_returns_ok() {
        let spec = InstallSpec {
            command: "true".into(),
            args: vec![],
        };
        install_dependencies(&spec, None).await.unwrap();
    }

    #[tokio::test]
    async fn nonzero_exit_is_install_error() {
        let spec = InstallSpec {
            command: "false".into(),
            args: vec![],
        };
        let err = install_dependencies(&spec, None).await.unwrap_err();
        assert!(matches!(err, FrontstageError::Install { .. }));
        assert!(err.to_string().starts_with("dependency install failed"));
    }

    #[tokio::test]
    async fn missing_command_is_install_error() {
        let spec = InstallSpec {
            command: "frontstage-no-such-package-manager".into(),
            args: vec!["install".into()],
        };
        let err = install_dependencies(&spec, None).await.unwrap_err();
        assert!(err.to_string().contains("cannot spawn"));
    }

    #[tokio::test]
    async fn timeout_kills_the_install() {
        let spec = InstallSpec {
            command: "sleep".into(),
            args: vec!["5".into()],
        };
        let err = install_dependencies(&spec, Some(Duration::from_millis(100)))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
