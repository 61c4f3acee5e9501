//! Shared types, error model, and configuration for Frontstage.
//!
//! This crate is the foundation depended on by all other Frontstage crates.
//! It provides:
//! - [`FrontstageError`] — the unified error type
//! - Domain types ([`RunId`], [`MergeReport`], [`EntryReport`])
//! - Configuration ([`AppConfig`], config loading and validation)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CONFIG_FILE_NAME, InstallConfig, LimitsConfig, SourceConfig, StagingConfig,
    init_config, load_config, load_config_from, validate_allowlist_entry, validate_config,
};
pub use error::{FrontstageError, Result};
pub use types::{CURRENT_SCHEMA_VERSION, EntryReport, MergeReport, RunId};
