//! Static agent configuration loaded once at startup.
//!
//! Settings live in a TOML file. Paths and secrets are required; hashing
//! and gate tuning fall back to defaults when omitted. [`DeployConfig::load`]
//! validates the result so later phases can treat the configured
//! directories as preconditions.

use crate::artefact::digest::{DEFAULT_CHUNK_SIZE, HashAlgorithm};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Default configuration file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "stagehand.toml";

const DEFAULT_AUTH_FAILURE_DELAY_MS: u64 = 1000;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema.
    #[error("invalid configuration file {path}: {source}")]
    Parse {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// Underlying deserialisation error.
        #[source]
        source: toml::de::Error,
    },

    /// A setting holds a value the agent cannot work with.
    #[error("{0}")]
    Invalid(String),
}

/// Agent configuration.
///
/// # Examples
///
/// ```
/// use stagehand::config::DeployConfig;
///
/// let config = DeployConfig::from_toml_str(
///     r#"
///     application_name = "shop"
///     secret = "hunter2"
///     package_dir = "/srv/upload"
///     extract_dir = "/srv/extract"
///     live_dir = "/srv/www/shop"
///     "#,
/// )
/// .expect("valid configuration");
/// assert_eq!(config.hash_algorithm, "xxh128");
/// assert_eq!(config.hash_chunk_size, 10 * 1024);
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DeployConfig {
    /// Application name used to derive archive and staging names.
    pub application_name: String,
    /// Shared secret callers must present.
    pub secret: String,
    /// Directory holding uploaded `<app>-<version>.zip` archives.
    pub package_dir: Utf8PathBuf,
    /// Directory under which `<app>-<version>/` staging directories live.
    pub extract_dir: Utf8PathBuf,
    /// The directory currently serving the application.
    pub live_dir: Utf8PathBuf,
    /// Identifier of the archive hash algorithm.
    #[serde(default = "DeployConfig::default_hash_algorithm")]
    pub hash_algorithm: String,
    /// Bytes read per hashing step.
    #[serde(default = "DeployConfig::default_hash_chunk_size")]
    pub hash_chunk_size: usize,
    /// Delay applied before rejecting an unauthorised request.
    #[serde(default = "DeployConfig::default_auth_failure_delay_ms")]
    pub auth_failure_delay_ms: u64,
}

impl DeployConfig {
    fn default_hash_algorithm() -> String {
        HashAlgorithm::Xxh128.name().to_owned()
    }

    const fn default_hash_chunk_size() -> usize {
        DEFAULT_CHUNK_SIZE
    }

    const fn default_auth_failure_delay_ms() -> u64 {
        DEFAULT_AUTH_FAILURE_DELAY_MS
    }

    /// Read, parse, and validate the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`] when the file
    /// cannot be loaded, and [`ConfigError::Invalid`] when
    /// [`Self::validate`] rejects it.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let config = toml::from_str::<Self>(&source).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text does not match the schema.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|source| ConfigError::Parse {
            path: Utf8PathBuf::from("<inline>"),
            source,
        })
    }

    /// Check the settings the agent relies on before serving any command.
    ///
    /// The hash algorithm is not checked here; an unknown algorithm is
    /// reported per request alongside the other format checks.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.application_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "the application name setting is empty".to_owned(),
            ));
        }
        if self.secret.is_empty() {
            return Err(ConfigError::Invalid("the secret setting is empty".to_owned()));
        }
        if self.hash_chunk_size == 0 {
            return Err(ConfigError::Invalid(
                "the hash chunk size must be greater than zero".to_owned(),
            ));
        }
        if self.live_dir.as_str().is_empty() {
            return Err(ConfigError::Invalid(
                "the live directory setting is empty".to_owned(),
            ));
        }
        if !self.live_dir.is_dir() {
            return Err(ConfigError::Invalid(format!(
                "cannot find the '{}' directory",
                self.live_dir
            )));
        }
        Ok(())
    }

    /// Return the configured hash algorithm if this build provides it.
    #[must_use]
    pub fn algorithm(&self) -> Option<HashAlgorithm> {
        HashAlgorithm::from_name(&self.hash_algorithm)
    }

    /// Return the unauthorised-request delay.
    #[must_use]
    pub fn auth_failure_delay(&self) -> Duration {
        Duration::from_millis(self.auth_failure_delay_ms)
    }
}
