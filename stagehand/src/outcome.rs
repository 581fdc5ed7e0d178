//! The structured result of one invocation.

use crate::error::DeployError;
use serde::Serialize;

/// Whether the invocation succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    /// The requested command completed.
    Success,
    /// The requested command stopped with an error.
    Error,
}

/// Result contract printed by the binary as JSON.
///
/// # Examples
///
/// ```
/// use stagehand::outcome::Outcome;
///
/// let outcome = Outcome::success(vec!["Success".to_owned()]);
/// assert_eq!(
///     outcome.to_json().expect("serialise"),
///     r#"{"type":"success","code":0,"messages":["Success"]}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// Success or error.
    #[serde(rename = "type")]
    pub kind: OutcomeKind,
    /// Zero on success, otherwise the error's numeric code.
    pub code: i32,
    /// Ordered diagnostic lines.
    pub messages: Vec<String>,
}

impl Outcome {
    /// Build a success outcome.
    #[must_use]
    pub fn success(messages: Vec<String>) -> Self {
        Self {
            kind: OutcomeKind::Success,
            code: 0,
            messages,
        }
    }

    /// Return whether this outcome reports success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.kind == OutcomeKind::Success
    }

    /// Serialise to a single-line JSON document.
    ///
    /// # Errors
    ///
    /// Returns the serialiser's error; not expected for this shape.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<&DeployError> for Outcome {
    fn from(err: &DeployError) -> Self {
        Self {
            kind: OutcomeKind::Error,
            code: err.code(),
            messages: err.messages(),
        }
    }
}

impl From<DeployError> for Outcome {
    fn from(err: DeployError) -> Self {
        Self::from(&err)
    }
}
