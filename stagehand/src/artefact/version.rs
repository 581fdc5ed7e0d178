//! Semantic version newtype for archive references.
//!
//! Accepts `MAJOR.MINOR.PATCH` with an optional `-prerelease` and an
//! optional `+build` tag, each made of ASCII alphanumerics and dots.

use super::error::{ArtefactError, Result};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

const SEMVER_PATTERN: &str = concat!(
    r"^(?<core>[0-9]+\.[0-9]+\.[0-9]+)",
    r"(?<prerelease>-[0-9A-Za-z.]+)?",
    r"(?<build>\+[0-9A-Za-z.]+)?$",
);

fn semver_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    // The pattern is a compile-time constant.
    REGEX.get_or_init(|| Regex::new(SEMVER_PATTERN).expect("SemVer pattern compiles"))
}

/// A validated semantic version string.
///
/// # Examples
///
/// ```
/// use stagehand::artefact::version::SemVer;
///
/// let version = SemVer::try_from("1.2.3-rc.1+build.7").expect("valid SemVer");
/// assert_eq!(version.core(), "1.2.3");
/// assert_eq!(version.prerelease(), Some("rc.1"));
/// assert_eq!(version.build(), Some("build.7"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemVer(String);

impl SemVer {
    /// Return the version as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the `MAJOR.MINOR.PATCH` component.
    #[must_use]
    pub fn core(&self) -> &str {
        self.capture("core").unwrap_or(&self.0)
    }

    /// Return the prerelease tag without its leading `-`.
    #[must_use]
    pub fn prerelease(&self) -> Option<&str> {
        self.capture("prerelease").map(|tag| tag.trim_start_matches('-'))
    }

    /// Return the build tag without its leading `+`.
    #[must_use]
    pub fn build(&self) -> Option<&str> {
        self.capture("build").map(|tag| tag.trim_start_matches('+'))
    }

    fn capture(&self, group: &str) -> Option<&str> {
        semver_regex()
            .captures(&self.0)
            .and_then(|caps| caps.name(group))
            .map(|m| m.as_str())
    }
}

impl TryFrom<&str> for SemVer {
    type Error = ArtefactError;

    fn try_from(value: &str) -> Result<Self> {
        validate_semver(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for SemVer {
    type Error = ArtefactError;

    fn try_from(value: String) -> Result<Self> {
        validate_semver(&value)?;
        Ok(Self(value))
    }
}

impl AsRef<str> for SemVer {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate_semver(value: &str) -> Result<()> {
    if semver_regex().is_match(value) {
        Ok(())
    } else {
        Err(ArtefactError::InvalidVersion {
            value: value.to_owned(),
        })
    }
}
