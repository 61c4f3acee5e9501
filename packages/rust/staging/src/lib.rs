//! Scratch directory lifecycle and allowlist staging for Frontstage.
//!
//! - [`Scratch`] — unique per-invocation temporary directory with
//!   guaranteed release on all exit paths
//! - [`stage_entries`] / [`verify_entries`] — validated, ordered copy of
//!   the allowlist into the destination, plus digest verification

pub mod copy;
pub mod scratch;

pub use copy::{file_digest, stage_entries, verify_entries};
pub use scratch::Scratch;
