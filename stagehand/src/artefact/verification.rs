//! Integrity verification for uploaded package archives.
//!
//! Verification runs in two phases. The format phase checks the signature,
//! the version, and the configured algorithm without touching the
//! filesystem, and reports every finding of that phase together. Only when
//! it is clean does the content phase locate the archive and compare its
//! streaming digest with the claim.

use super::digest::{HashAlgorithm, digest_file};
use super::error::ArtefactError;
use super::reference::ArchiveReference;
use super::signature::{IntegrityClaim, validate_hex};
use super::version::SemVer;
use crate::config::DeployConfig;
use log::debug;
use std::path::{Path, PathBuf};

/// An archive whose digest matched the caller's claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedArchive {
    /// Identity of the verified package.
    pub reference: ArchiveReference,
    /// Location of the archive on disk.
    pub path: PathBuf,
    /// The digest that was computed and matched.
    pub digest: String,
}

/// Outcome of verifying one archive against one claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    /// The computed digest equals the claim.
    Valid(VerifiedArchive),
    /// The computed digest differs from the claim.
    Mismatch {
        /// The caller-supplied signature.
        expected: String,
        /// The digest computed from the archive.
        computed: String,
        /// The algorithm used for both.
        algorithm: HashAlgorithm,
    },
    /// No regular file exists under the canonical archive name.
    FileNotFound {
        /// The canonical file name that was looked up.
        file_name: String,
    },
    /// The archive exists but could not be read to completion.
    Unreadable {
        /// The canonical file name.
        file_name: String,
        /// The underlying I/O failure.
        reason: String,
    },
    /// One or more request values failed the format phase.
    MalformedClaim {
        /// Every finding of the format phase, in check order.
        errors: Vec<ArtefactError>,
    },
}

impl VerificationResult {
    /// Return whether the archive verified.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// Operator-facing diagnostic lines, earliest context first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Valid(archive) => vec![format!(
                "application file '{}' verified",
                archive.reference.file_name()
            )],
            Self::Mismatch {
                expected,
                computed,
                algorithm,
            } => vec![
                "Computed hash doesn't match APP_SIGNATURE".to_owned(),
                format!("APP_SIGNATURE: {expected}"),
                format!("Computed hash: {computed}"),
                format!("HASH_ALGORITHM: {algorithm}"),
            ],
            Self::FileNotFound { file_name } => {
                vec![format!("application file '{file_name}' not found")]
            }
            Self::Unreadable { file_name, reason } => {
                vec![format!("application file '{file_name}' could not be read: {reason}")]
            }
            Self::MalformedClaim { errors } => errors.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Checks package archives against caller-supplied claims.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use stagehand::artefact::verification::{VerificationResult, Verifier};
///
/// let verifier = Verifier::new("app", Path::new("/nonexistent"), "xxh128", 10 * 1024);
/// let result = verifier.verify("not-semver", "abc");
/// assert!(matches!(result, VerificationResult::MalformedClaim { ref errors } if errors.len() == 2));
/// ```
#[derive(Debug, Clone)]
pub struct Verifier<'a> {
    application_name: &'a str,
    package_dir: &'a Path,
    algorithm_name: &'a str,
    chunk_size: usize,
}

impl<'a> Verifier<'a> {
    /// Create a verifier for archives named after `application_name` in
    /// `package_dir`.
    #[must_use]
    pub fn new(
        application_name: &'a str,
        package_dir: &'a Path,
        algorithm_name: &'a str,
        chunk_size: usize,
    ) -> Self {
        Self {
            application_name,
            package_dir,
            algorithm_name,
            chunk_size,
        }
    }

    /// Create a verifier from loaded configuration.
    #[must_use]
    pub fn from_config(config: &'a DeployConfig) -> Self {
        Self::new(
            &config.application_name,
            config.package_dir.as_std_path(),
            &config.hash_algorithm,
            config.hash_chunk_size,
        )
    }

    /// Verify the archive for `version` against `signature`.
    ///
    /// Read-only: the archive is opened for reading and nothing else is
    /// touched.
    #[must_use]
    pub fn verify(&self, version: &str, signature: &str) -> VerificationResult {
        let (reference, claim) = match self.check_formats(version, signature) {
            Ok(parsed) => parsed,
            Err(errors) => return VerificationResult::MalformedClaim { errors },
        };

        let file_name = reference.file_name();
        let path = reference.archive_path(self.package_dir);
        if !path.is_file() {
            return VerificationResult::FileNotFound { file_name };
        }

        debug!(
            "hashing {} with {} in {}-byte chunks",
            path.display(),
            claim.algorithm(),
            self.chunk_size
        );
        let computed = match digest_file(&path, claim.algorithm(), self.chunk_size) {
            Ok(computed) => computed,
            Err(err) => {
                return VerificationResult::Unreadable {
                    file_name,
                    reason: err.to_string(),
                };
            }
        };

        if claim.matches(&computed) {
            VerificationResult::Valid(VerifiedArchive {
                reference,
                path,
                digest: computed,
            })
        } else {
            VerificationResult::Mismatch {
                expected: claim.as_str().to_owned(),
                computed,
                algorithm: claim.algorithm(),
            }
        }
    }

    /// Run the format phase, collecting every finding.
    fn check_formats(
        &self,
        version: &str,
        signature: &str,
    ) -> Result<(ArchiveReference, IntegrityClaim), Vec<ArtefactError>> {
        let algorithm = HashAlgorithm::from_name(self.algorithm_name);
        let mut errors = Vec::new();

        let claim = match algorithm {
            Some(algorithm) => IntegrityClaim::new(signature, algorithm)
                .map_err(|err| errors.push(err))
                .ok(),
            None => {
                if let Err(err) = validate_hex(signature, None) {
                    errors.push(err);
                }
                None
            }
        };

        let version = SemVer::try_from(version)
            .map_err(|err| errors.push(err))
            .ok();

        if algorithm.is_none() {
            errors.push(ArtefactError::UnsupportedAlgorithm {
                name: self.algorithm_name.to_owned(),
            });
        }

        match (claim, version) {
            (Some(claim), Some(version)) if errors.is_empty() => Ok((
                ArchiveReference::new(self.application_name, version),
                claim,
            )),
            _ => {
                debug!("format checks failed: {errors:?}");
                Err(errors)
            }
        }
    }
}

#[cfg(test)]
#[path = "verification_tests.rs"]
mod tests;
