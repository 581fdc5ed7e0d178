//! Error types for the deployment agent.
//!
//! Every terminal failure of a run is a [`DeployError`]. Each variant maps to
//! a stable numeric code and an ordered list of operator-facing messages,
//! which together form the error outcome printed by the binary.

use crate::artefact::extraction::ExtractionError;
use crate::config::ConfigError;
use crate::swap::SwapError;
use thiserror::Error;

/// Errors that end a deployment run.
#[derive(Debug, Error)]
pub enum DeployError {
    /// A request value was missing or malformed.
    #[error("{}", messages.join("; "))]
    InputValidation {
        /// Every finding, in check order.
        messages: Vec<String>,
    },

    /// The caller did not present the configured secret.
    #[error("invalid request")]
    Unauthorised,

    /// The archive failed format checks, was missing, or did not match its
    /// signature.
    #[error("{}", messages.join("; "))]
    Integrity {
        /// Verification diagnostics, in order.
        messages: Vec<String>,
    },

    /// The verified archive could not be unpacked.
    #[error("unable to extract the app package")]
    Extraction {
        /// The underlying extraction failure.
        #[source]
        source: ExtractionError,
    },

    /// The swap stopped with the live slot intact or recoverable.
    #[error(transparent)]
    SwapRecoverable(SwapError),

    /// The swap could not restore the previous release.
    #[error(transparent)]
    SwapPanic(SwapError),

    /// Configuration could not be loaded or failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An I/O operation outside the swap failed.
    #[error("{context}: {source}")]
    Io {
        /// What was being attempted.
        context: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl DeployError {
    /// Build an input validation error with a single message.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InputValidation {
            messages: vec![message.into()],
        }
    }

    /// Numeric code reported in the outcome and used as the exit status.
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::Io { .. } => 1,
            Self::InputValidation { .. } => 2,
            Self::Unauthorised => 3,
            Self::Config(_) => 4,
            Self::Integrity { .. } => 10,
            Self::Extraction { .. } => 20,
            Self::SwapRecoverable(_) => 30,
            Self::SwapPanic(_) => 31,
        }
    }

    /// Ordered operator-facing messages, headline first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::InputValidation { messages } | Self::Integrity { messages } => messages.clone(),
            Self::Extraction { source } => vec![self.to_string(), source.to_string()],
            Self::SwapRecoverable(err) | Self::SwapPanic(err) => {
                std::iter::once(err.to_string()).chain(err.detail()).collect()
            }
            Self::Unauthorised | Self::Config(_) | Self::Io { .. } => vec![self.to_string()],
        }
    }
}

impl From<SwapError> for DeployError {
    fn from(err: SwapError) -> Self {
        if err.is_panic() {
            Self::SwapPanic(err)
        } else {
            Self::SwapRecoverable(err)
        }
    }
}

impl From<ExtractionError> for DeployError {
    fn from(source: ExtractionError) -> Self {
        Self::Extraction { source }
    }
}

/// Convenience alias for deployment results.
pub type Result<T> = std::result::Result<T, DeployError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::PathBuf;

    fn panic_error() -> SwapError {
        SwapError::Panic {
            live: PathBuf::from("/srv/www/app"),
            backup: PathBuf::from("/srv/www/app-backup-20250101000000"),
            promote_reason: "denied".to_owned(),
            restore_reason: "denied".to_owned(),
        }
    }

    #[test]
    fn panic_swap_errors_never_coalesce_with_recoverable_ones() {
        let panic: DeployError = panic_error().into();
        let recoverable: DeployError = SwapError::RolledBack {
            reason: "denied".to_owned(),
        }
        .into();

        assert!(matches!(panic, DeployError::SwapPanic(_)));
        assert!(matches!(recoverable, DeployError::SwapRecoverable(_)));
        assert_ne!(panic.code(), recoverable.code());
    }

    #[rstest]
    #[case::io(
        DeployError::Io { context: "write".to_owned(), source: std::io::Error::other("x") },
        1
    )]
    #[case::input(DeployError::invalid_input("invalid parameters"), 2)]
    #[case::unauthorised(DeployError::Unauthorised, 3)]
    #[case::config(DeployError::Config(ConfigError::Invalid("bad".to_owned())), 4)]
    #[case::integrity(DeployError::Integrity { messages: vec![] }, 10)]
    #[case::swap_panic(DeployError::SwapPanic(panic_error()), 31)]
    fn codes_are_stable(#[case] err: DeployError, #[case] code: i32) {
        assert_eq!(err.code(), code);
    }

    #[test]
    fn extraction_messages_lead_with_the_operator_message() {
        let err: DeployError = ExtractionError::PathTraversal {
            path: "../x".to_owned(),
        }
        .into();
        assert_eq!(err.code(), 20);
        assert_eq!(
            err.messages(),
            vec![
                "unable to extract the app package".to_owned(),
                "path traversal detected: ../x".to_owned(),
            ]
        );
    }

    #[test]
    fn swap_messages_append_the_cause() {
        let err: DeployError = SwapError::RolledBack {
            reason: "cross-device link".to_owned(),
        }
        .into();
        assert_eq!(
            err.messages(),
            vec![
                "deploy failed, rollback succeeded, please verify that everything still ok"
                    .to_owned(),
                "cross-device link".to_owned(),
            ]
        );
    }

    #[test]
    fn validation_messages_keep_their_order() {
        let err = DeployError::InputValidation {
            messages: vec!["first".to_owned(), "second".to_owned()],
        };
        assert_eq!(err.messages(), vec!["first", "second"]);
        assert_eq!(err.to_string(), "first; second");
    }
}
