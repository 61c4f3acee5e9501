//! Merge pipeline orchestration for Frontstage.
//!
//! Ties dependency installation, source acquisition, and allowlist
//! staging together into [`pipeline::merge_assets`], the single
//! operation this tool exists for.

pub mod install;
pub mod pipeline;
pub mod report;

pub use install::{InstallSpec, install_dependencies};
pub use pipeline::{MergeConfig, MergeOutcome, ProgressReporter, SilentProgress, merge_assets};
pub use report::{build_report, write_report};
