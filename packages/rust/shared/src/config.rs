//! Application configuration for Frontstage.
//!
//! Config lives in `frontstage.toml` next to the build (working
//! directory), not under the user's home: a staging step is checked in
//! with the project it deploys. CLI flags override config file values,
//! which override defaults.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FrontstageError, Result};

/// Default configuration file name, resolved against the working directory.
pub const CONFIG_FILE_NAME: &str = "frontstage.toml";

// ---------------------------------------------------------------------------
// Config structs (matching frontstage.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Upstream frontend source.
    #[serde(default)]
    pub source: SourceConfig,

    /// Allowlist and destination.
    #[serde(default)]
    pub staging: StagingConfig,

    /// Backend dependency installation.
    #[serde(default)]
    pub install: InstallConfig,

    /// Timeouts for the long-running steps.
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Remote to acquire the frontend tree from. An HTTPS clone URL for
    /// `kind = "git"`, a filesystem path for `kind = "local"`.
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Branch or tag to check out. Empty means the remote default.
    #[serde(default)]
    pub reference: String,

    /// Acquisition mechanism: "git" or "local".
    #[serde(default = "default_source_kind")]
    pub kind: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            reference: String::new(),
            kind: default_source_kind(),
        }
    }
}

fn default_remote() -> String {
    "https://github.com/mufasa-real-assistant/frontend.git".into()
}
fn default_source_kind() -> String {
    "git".into()
}

/// `[staging]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Ordered relative paths copied from the fetched tree into the
    /// destination. The one piece of business logic in this step.
    #[serde(default = "default_allowlist")]
    pub allowlist: Vec<String>,

    /// Destination directory receiving the staged assets.
    #[serde(default = "default_dest_dir")]
    pub dest_dir: String,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            allowlist: default_allowlist(),
            dest_dir: default_dest_dir(),
        }
    }
}

fn default_allowlist() -> Vec<String> {
    vec![
        "index.html".into(),
        "assets".into(),
        "portal.css".into(),
        "portal.js".into(),
        "tabs.js".into(),
    ]
}
fn default_dest_dir() -> String {
    ".".into()
}

/// `[install]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallConfig {
    /// Whether to run the package manager at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Package manager executable.
    #[serde(default = "default_install_command")]
    pub command: String,

    /// Arguments, including the dependency manifest path.
    #[serde(default = "default_install_args")]
    pub args: Vec<String>,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: default_install_command(),
            args: default_install_args(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_install_command() -> String {
    "pip".into()
}
fn default_install_args() -> Vec<String> {
    vec!["install".into(), "-r".into(), "requirements.txt".into()]
}

/// `[limits]` section. A value of 0 disables the timeout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Seconds allowed for the dependency install.
    #[serde(default)]
    pub install_timeout_secs: u64,

    /// Seconds allowed for the source fetch.
    #[serde(default)]
    pub fetch_timeout_secs: u64,
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the application config from `frontstage.toml` in `dir`.
/// Returns defaults if the file does not exist.
pub fn load_config(dir: &Path) -> Result<AppConfig> {
    let path = dir.join(CONFIG_FILE_NAME);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| FrontstageError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        FrontstageError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Write a default config file into `dir`. Returns the path to the
/// created file.
pub fn init_config(dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| FrontstageError::io(dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| FrontstageError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| FrontstageError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate the resolved configuration before running a merge.
///
/// Allowlist entries must be relative and must not traverse out of the
/// tree; a git remote must parse as a URL.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.staging.allowlist.is_empty() {
        return Err(FrontstageError::config("allowlist is empty"));
    }

    for entry in &config.staging.allowlist {
        validate_allowlist_entry(entry)?;
    }

    match config.source.kind.as_str() {
        "git" => {
            url::Url::parse(&config.source.remote).map_err(|e| {
                FrontstageError::config(format!(
                    "source.remote '{}' is not a valid URL: {e}",
                    config.source.remote
                ))
            })?;
        }
        "local" => {
            if config.source.remote.is_empty() {
                return Err(FrontstageError::config(
                    "source.remote must be a path when source.kind = \"local\"",
                ));
            }
        }
        other => {
            return Err(FrontstageError::config(format!(
                "unknown source.kind '{other}': expected 'git' or 'local'"
            )));
        }
    }

    Ok(())
}

/// Check a single allowlist entry for path safety.
pub fn validate_allowlist_entry(entry: &str) -> Result<()> {
    let trimmed = entry.trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(FrontstageError::config("allowlist entry is empty"));
    }

    let path = Path::new(trimmed);
    for component in path.components() {
        match component {
            Component::Normal(_) => {}
            Component::CurDir => {}
            _ => {
                return Err(FrontstageError::config(format!(
                    "allowlist entry '{entry}' must be a relative path without '..'"
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("allowlist"));
        assert!(toml_str.contains("index.html"));
        assert!(toml_str.contains("requirements.txt"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.staging.allowlist.len(), 5);
        assert_eq!(parsed.install.command, "pip");
        assert!(parsed.install.enabled);
        assert_eq!(parsed.limits.fetch_timeout_secs, 0);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[source]
remote = "https://git.example.com/frontend.git"

[staging]
allowlist = ["index.html", "assets/"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.source.remote, "https://git.example.com/frontend.git");
        assert_eq!(config.source.kind, "git");
        assert_eq!(config.staging.allowlist.len(), 2);
        assert_eq!(config.staging.dest_dir, ".");
        assert_eq!(config.install.args, vec!["install", "-r", "requirements.txt"]);
    }

    #[test]
    fn default_config_validates() {
        let config = AppConfig::default();
        validate_config(&config).expect("default config is valid");
    }

    #[test]
    fn empty_allowlist_rejected() {
        let mut config = AppConfig::default();
        config.staging.allowlist.clear();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("allowlist is empty"));
    }

    #[test]
    fn traversal_entry_rejected() {
        assert!(validate_allowlist_entry("../etc/passwd").is_err());
        assert!(validate_allowlist_entry("/etc/passwd").is_err());
        assert!(validate_allowlist_entry("assets/../..").is_err());
        assert!(validate_allowlist_entry("assets/").is_ok());
        assert!(validate_allowlist_entry("nested/portal.js").is_ok());
    }

    #[test]
    fn bad_remote_url_rejected() {
        let mut config = AppConfig::default();
        config.source.remote = "not a url".into();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("not a valid URL"));
    }

    #[test]
    fn unknown_source_kind_rejected() {
        let mut config = AppConfig::default();
        config.source.kind = "svn".into();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("unknown source.kind"));
    }

    #[test]
    fn init_and_load_roundtrip() {
        let tmp = std::env::temp_dir().join(format!(
            "frontstage-config-test-{}",
            uuid::Uuid::now_v7()
        ));
        let path = init_config(&tmp).expect("init config");
        assert!(path.exists());

        let loaded = load_config(&tmp).expect("load config");
        assert_eq!(loaded.staging.allowlist.len(), 5);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn load_missing_config_uses_defaults() {
        let tmp = std::env::temp_dir().join(format!(
            "frontstage-config-missing-{}",
            uuid::Uuid::now_v7()
        ));
        let config = load_config(&tmp).expect("defaults");
        assert_eq!(config.install.command, "pip");
    }
}
