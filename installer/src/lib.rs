//! piam-anc installer library.
//!
//! This crate installs the PIAM Admin Network Configurator (`piam-anc`)
//! from its pinned GitHub release. It is used by the `piam-anc-installer`
//! CLI binary and can be consumed programmatically for testing or custom
//! installation workflows.
//!
//! # Modules
//!
//! - [`artefact`] - Release table, fetching, verification and extraction
//! - [`cli`] - Command-line argument definitions
//! - [`dirs`] - Directory resolution abstraction for the default prefix
//! - [`error`] - Error kinds and exit codes
//! - [`installer`] - The fetch, verify, extract and place pipeline
//! - [`layout`] - Bin and state directory resolution
//! - [`logging`] - Stderr diagnostics subscriber for `-v`/`-vv`
//! - [`output`] - Progress, guidance and dry-run formatting
//! - [`placement`] - Atomic executable placement and state provisioning
//! - [`platform`] - Host platform canonicalisation
//! - [`smoke`] - Post-install `--version` check

pub mod artefact;
pub mod cli;
pub mod dirs;
pub mod error;
pub mod installer;
pub mod layout;
pub mod logging;
pub mod output;
pub mod placement;
pub mod platform;
pub mod smoke;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
