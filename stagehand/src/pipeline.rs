//! Command orchestration: verify, extract, and swap in the requested order.
//!
//! A run executes the phases its [`Command`] names and stops at the first
//! failure, so a later phase never starts after an earlier one failed. Each
//! phase is timed into a [`PhaseTimings`] owned by the run and returned in
//! the [`RunReport`].

use crate::artefact::extraction::ArchiveExtractor;
use crate::artefact::reference::ArchiveReference;
use crate::artefact::verification::{VerificationResult, VerifiedArchive, Verifier};
use crate::artefact::version::SemVer;
use crate::config::DeployConfig;
use crate::error::{DeployError, Result};
use crate::fs_ops::DirectoryOps;
use crate::swap::SwapController;
use crate::timing::{Phase, PhaseTimings};
use log::{debug, error, info};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// The closed set of commands the agent accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Report the agent's version and configuration.
    Info,
    /// Verify and extract an archive without deploying it.
    Extract,
    /// Swap an already extracted release into the live directory.
    Deploy,
    /// Verify, extract, and swap in one run.
    ExtractAndDeploy,
}

impl Command {
    /// Every command, in the order they are listed to callers.
    pub const ALL: [Self; 4] = [Self::Info, Self::Extract, Self::Deploy, Self::ExtractAndDeploy];

    /// The command's wire name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Extract => "extract",
            Self::Deploy => "deploy",
            Self::ExtractAndDeploy => "extract-and-deploy",
        }
    }

    /// One-line description shown when an unknown command is requested.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Info => "report the agent version, host and configuration",
            Self::Extract => "verify and extract the archive only",
            Self::Deploy => "deploy an already extracted app",
            Self::ExtractAndDeploy => "execute both extract and deploy",
        }
    }

    /// Messages returned for an unknown or missing command.
    #[must_use]
    pub fn usage_messages() -> Vec<String> {
        let mut messages = vec![
            "invalid COMMAND".to_owned(),
            "valid commands are: ".to_owned(),
        ];
        messages.extend(
            Self::ALL
                .iter()
                .map(|command| format!("{}:  {}", command.name(), command.description())),
        );
        messages
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = DeployError;

    /// Parse a command name, ignoring ASCII case.
    fn from_str(value: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|command| command.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| DeployError::InputValidation {
                messages: Self::usage_messages(),
            })
    }
}

/// One caller request after authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    command: Command,
    version: Option<String>,
    signature: Option<String>,
}

impl DeployRequest {
    /// Build a request; empty strings are treated as absent.
    #[must_use]
    pub fn new(command: Command, version: Option<String>, signature: Option<String>) -> Self {
        Self {
            command,
            version: version.filter(|value| !value.is_empty()),
            signature: signature.filter(|value| !value.is_empty()),
        }
    }

    /// The requested command.
    #[must_use]
    pub fn command(&self) -> Command {
        self.command
    }

    /// The claimed application version, if given.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// The claimed archive signature, if given.
    #[must_use]
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }
}

/// The result of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// The command that ran.
    pub command: Command,
    /// Per-phase durations.
    pub timings: PhaseTimings,
    /// Staging directory produced or consumed by the run.
    pub staging_dir: Option<PathBuf>,
    /// Set when the swap succeeded but its backup could not be deleted.
    pub cleanup_warning: Option<String>,
    /// Informational lines for the `info` command.
    pub info: Vec<String>,
}

impl RunReport {
    fn new(command: Command, timings: PhaseTimings) -> Self {
        Self {
            command,
            timings,
            staging_dir: None,
            cleanup_warning: None,
            info: Vec::new(),
        }
    }

    /// Outcome messages in reporting order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        if self.command == Command::Info {
            return self.info.clone();
        }
        let mut messages = vec!["Success".to_owned()];
        messages.extend(self.timings.lines());
        if let Some(warning) = &self.cleanup_warning {
            messages.push(format!("Warning: {warning}"));
        }
        messages
    }
}

/// Sequences verifier, extractor, and swap controller for one request.
pub struct Pipeline<'a> {
    config: &'a DeployConfig,
    extractor: &'a dyn ArchiveExtractor,
    ops: &'a dyn DirectoryOps,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline over the given collaborators.
    #[must_use]
    pub fn new(
        config: &'a DeployConfig,
        extractor: &'a dyn ArchiveExtractor,
        ops: &'a dyn DirectoryOps,
    ) -> Self {
        Self {
            config,
            extractor,
            ops,
        }
    }

    /// Execute `request`.
    ///
    /// # Errors
    ///
    /// Returns the [`DeployError`] of the first failing phase.
    pub fn run(&self, request: &DeployRequest) -> Result<RunReport> {
        let mut timings = PhaseTimings::start();
        debug!("running {}", request.command());
        match request.command() {
            Command::Info => {
                let mut report = RunReport::new(Command::Info, timings);
                report.info = crate::info::report(self.config);
                Ok(report)
            }
            Command::Extract => {
                let staging = self.extract(request, &mut timings)?;
                let mut report = RunReport::new(Command::Extract, timings);
                report.staging_dir = Some(staging);
                Ok(report)
            }
            Command::Deploy => {
                let (staging, cleanup_warning) = self.deploy(request, &mut timings)?;
                let mut report = RunReport::new(Command::Deploy, timings);
                report.staging_dir = Some(staging);
                report.cleanup_warning = cleanup_warning;
                Ok(report)
            }
            Command::ExtractAndDeploy => {
                self.extract(request, &mut timings)?;
                let (staging, cleanup_warning) = self.deploy(request, &mut timings)?;
                let mut report = RunReport::new(Command::ExtractAndDeploy, timings);
                report.staging_dir = Some(staging);
                report.cleanup_warning = cleanup_warning;
                Ok(report)
            }
        }
    }

    fn extract(&self, request: &DeployRequest, timings: &mut PhaseTimings) -> Result<PathBuf> {
        let (Some(version), Some(signature)) = (request.version(), request.signature()) else {
            return Err(DeployError::invalid_input("invalid parameters"));
        };

        let archive = timings.time(Phase::Validate, || self.validate(version, signature))?;
        let staging = archive
            .reference
            .staging_path(self.config.extract_dir.as_std_path());

        timings.time(Phase::Extract, || -> Result<()> {
            let extract_dir = self.config.extract_dir.as_std_path();
            std::fs::create_dir_all(extract_dir).map_err(|source| DeployError::Io {
                context: format!("cannot create the extract directory '{}'", extract_dir.display()),
                source,
            })?;
            let report = self
                .extractor
                .extract(&archive.path, &staging)
                .map_err(|err| {
                    error!("extracting {} failed: {err}", archive.path.display());
                    DeployError::from(err)
                })?;
            info!(
                "extracted {} files and {} directories into {}",
                report.files,
                report.directories,
                staging.display()
            );
            Ok(())
        })?;
        Ok(staging)
    }

    fn validate(&self, version: &str, signature: &str) -> Result<VerifiedArchive> {
        match Verifier::from_config(self.config).verify(version, signature) {
            VerificationResult::Valid(archive) => {
                info!("verified {} with digest {}", archive.path.display(), archive.digest);
                Ok(archive)
            }
            malformed @ VerificationResult::MalformedClaim { .. } => {
                Err(DeployError::InputValidation {
                    messages: malformed.messages(),
                })
            }
            failed => Err(DeployError::Integrity {
                messages: failed.messages(),
            }),
        }
    }

    fn deploy(
        &self,
        request: &DeployRequest,
        timings: &mut PhaseTimings,
    ) -> Result<(PathBuf, Option<String>)> {
        let Some(version) = request.version() else {
            return Err(DeployError::invalid_input("invalid parameters"));
        };
        timings.time(Phase::Deploy, || -> Result<(PathBuf, Option<String>)> {
            let version =
                SemVer::try_from(version).map_err(|err| DeployError::invalid_input(err.to_string()))?;
            let reference = ArchiveReference::new(self.config.application_name.as_str(), version);
            let staging = reference.staging_path(self.config.extract_dir.as_std_path());
            if !self.ops.has_entries(&staging) {
                return Err(DeployError::invalid_input(format!(
                    "staging directory not found or empty: '{}'",
                    staging.display()
                )));
            }

            let report =
                SwapController::new(self.ops).swap(self.config.live_dir.as_std_path(), &staging)?;
            Ok((staging, report.cleanup_warning))
        })
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
