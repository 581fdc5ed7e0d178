//! Integrity claim newtype for caller-supplied archive signatures.
//!
//! A claim is a lowercase hexadecimal digest whose length is fixed by the
//! hash algorithm it is checked against.

use super::digest::HashAlgorithm;
use super::error::{ArtefactError, Result};
use std::fmt;

/// A validated signature paired with the algorithm that produced it.
///
/// # Examples
///
/// ```
/// use stagehand::artefact::digest::HashAlgorithm;
/// use stagehand::artefact::signature::IntegrityClaim;
///
/// let hex = "0123456789abcdef0123456789abcdef";
/// let claim = IntegrityClaim::new(hex, HashAlgorithm::Xxh128).expect("valid claim");
/// assert_eq!(claim.as_str(), hex);
/// assert!(IntegrityClaim::new(&hex[..31], HashAlgorithm::Xxh128).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IntegrityClaim {
    hex: String,
    algorithm: HashAlgorithm,
}

impl IntegrityClaim {
    /// Validate `value` as a digest for `algorithm`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtefactError::InvalidSignature`] when the length differs
    /// from [`HashAlgorithm::hex_len`] or any character is not lowercase hex.
    pub fn new(value: &str, algorithm: HashAlgorithm) -> Result<Self> {
        validate_hex(value, Some(algorithm.hex_len()))?;
        Ok(Self {
            hex: value.to_owned(),
            algorithm,
        })
    }

    /// Return the claimed digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.hex
    }

    /// Return the algorithm the claim is checked against.
    #[must_use]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Return whether `computed` is exactly the claimed digest.
    #[must_use]
    pub fn matches(&self, computed: &str) -> bool {
        self.hex == computed
    }
}

impl fmt::Display for IntegrityClaim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}

/// Check `value` is lowercase hex, optionally of an exact length.
///
/// Used without a length when the configured algorithm is unknown, so the
/// signature can still be judged in the same validation pass.
pub(crate) fn validate_hex(value: &str, expected_len: Option<usize>) -> Result<()> {
    if value.is_empty() {
        return Err(ArtefactError::InvalidSignature {
            reason: "signature is empty".to_owned(),
        });
    }
    match expected_len {
        Some(len) if value.len() != len => {
            return Err(ArtefactError::InvalidSignature {
                reason: format!("expected {len} hex characters, got {}", value.len()),
            });
        }
        _ => {}
    }
    if let Some(bad) = value.chars().find(|c| !matches!(c, '0'..='9' | 'a'..='f')) {
        return Err(ArtefactError::InvalidSignature {
            reason: format!("character '{bad}' is not lowercase hex"),
        });
    }
    Ok(())
}
