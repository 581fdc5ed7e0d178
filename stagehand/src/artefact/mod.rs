//! Package identity, integrity verification, and extraction.
//!
//! # Sub-modules
//!
//! - [`digest`] - Streaming digests over the supported hash algorithms.
//! - [`error`] - Format errors for request-supplied values.
//! - [`extraction`] - Zip extraction with path traversal protection.
//! - [`reference`] - Archive and staging directory naming (`ArchiveReference`).
//! - [`signature`] - Caller-supplied digest claims (`IntegrityClaim`).
//! - [`verification`] - Two-phase archive verification (`Verifier`).
//! - [`version`] - Semantic version newtype (`SemVer`).

pub mod digest;
pub mod error;
pub mod extraction;
pub mod reference;
pub mod signature;
pub mod verification;
pub mod version;
