//! Error types for caller-supplied archive identity and integrity claims.
//!
//! Display strings are the operator-facing diagnostics; the detailed reason
//! is kept on the variant for logs.

use thiserror::Error;

/// Errors arising from malformed request values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtefactError {
    /// The signature is not a lowercase hex digest of the expected length.
    #[error("'APP_SIGNATURE' is not a valid signature")]
    InvalidSignature {
        /// Description of the validation failure.
        reason: String,
    },

    /// The version string does not follow the SemVer grammar.
    #[error("'APP_VER' is not a valid SemVer")]
    InvalidVersion {
        /// The rejected version string.
        value: String,
    },

    /// The configured hash algorithm is not compiled into this build.
    #[error("Hash algorithm '{name}' not available on this server, try with another one")]
    UnsupportedAlgorithm {
        /// The configured algorithm identifier.
        name: String,
    },
}

/// Result type alias using [`ArtefactError`].
pub type Result<T> = std::result::Result<T, ArtefactError>;
