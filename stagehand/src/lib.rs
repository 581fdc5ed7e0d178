//! stagehand deployment agent library.
//!
//! This crate verifies an uploaded application archive, extracts it into a
//! version-named staging directory, and swaps the staged release into the
//! live directory with a rollback path on partial failure. It is used by the
//! `stagehand` binary and can be driven programmatically from tests.
//!
//! # Modules
//!
//! - [`artefact`] - Archive identity, integrity verification, and extraction
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - TOML configuration loading and validation
//! - [`error`] - Deployment error taxonomy and numeric codes
//! - [`fs_ops`] - Filesystem seam used by the swap controller
//! - [`gate`] - Shared-secret request authorisation
//! - [`info`] - The `info` command report
//! - [`outcome`] - JSON result contract
//! - [`pipeline`] - Command parsing and phase orchestration
//! - [`swap`] - Atomic live directory swap state machine
//! - [`timing`] - Per-phase wall-clock timing

pub mod artefact;
pub mod cli;
pub mod config;
pub mod error;
pub mod fs_ops;
pub mod gate;
pub mod info;
pub mod outcome;
pub mod pipeline;
pub mod swap;
pub mod timing;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
