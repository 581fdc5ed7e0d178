//! Caller authentication against the configured shared secret.

use crate::config::DeployConfig;
use crate::error::{DeployError, Result};
use log::warn;
use std::time::Duration;

/// Admits or rejects a request based on the presented secret.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use stagehand::gate::RequestGate;
///
/// let gate = RequestGate::new("s3cret", Duration::ZERO);
/// assert!(gate.authorise(Some("s3cret")).is_ok());
/// assert!(gate.authorise(Some("guess")).is_err());
/// assert!(gate.authorise(None).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct RequestGate {
    secret: String,
    failure_delay: Duration,
}

impl RequestGate {
    /// Create a gate for `secret`, pausing for `failure_delay` on every
    /// rejection.
    #[must_use]
    pub fn new(secret: impl Into<String>, failure_delay: Duration) -> Self {
        Self {
            secret: secret.into(),
            failure_delay,
        }
    }

    /// Create a gate from loaded configuration.
    #[must_use]
    pub fn from_config(config: &DeployConfig) -> Self {
        Self::new(config.secret.clone(), config.auth_failure_delay())
    }

    /// Check `presented` against the configured secret.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::Unauthorised`] when the secret is absent, empty
    /// or different, after sleeping for the configured delay.
    pub fn authorise(&self, presented: Option<&str>) -> Result<()> {
        let admitted = presented
            .filter(|value| !value.is_empty())
            .is_some_and(|value| secrets_match(value.as_bytes(), self.secret.as_bytes()));
        if admitted {
            return Ok(());
        }
        warn!("rejected request with an invalid secret");
        if !self.failure_delay.is_zero() {
            std::thread::sleep(self.failure_delay);
        }
        Err(DeployError::Unauthorised)
    }
}

/// Compare without stopping at the first differing byte.
fn secrets_match(presented: &[u8], expected: &[u8]) -> bool {
    if presented.len() != expected.len() {
        return false;
    }
    presented
        .iter()
        .zip(expected)
        .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
