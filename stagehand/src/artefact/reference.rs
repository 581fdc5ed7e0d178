//! Archive naming policy for deployable packages.
//!
//! A package is identified by application name and version. Both the
//! uploaded archive (`<app>-<version>.zip`) and its staging directory
//! (`<app>-<version>`) are derived from that pair.

use super::version::SemVer;
use std::fmt;
use std::path::{Path, PathBuf};

/// The fixed file extension for package archives.
const ARCHIVE_EXTENSION: &str = ".zip";

/// A versioned package identity.
///
/// # Examples
///
/// ```
/// use stagehand::artefact::reference::ArchiveReference;
/// use stagehand::artefact::version::SemVer;
///
/// let version = SemVer::try_from("1.2.3").expect("valid SemVer");
/// let reference = ArchiveReference::new("app", version);
/// assert_eq!(reference.file_name(), "app-1.2.3.zip");
/// assert_eq!(reference.staging_dir_name(), "app-1.2.3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArchiveReference {
    application_name: String,
    version: SemVer,
}

impl ArchiveReference {
    /// Create a reference from a configured application name and a
    /// validated version.
    #[must_use]
    pub fn new(application_name: impl Into<String>, version: SemVer) -> Self {
        Self {
            application_name: application_name.into(),
            version,
        }
    }

    /// Return the application name component.
    #[must_use]
    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    /// Return the version component.
    #[must_use]
    pub fn version(&self) -> &SemVer {
        &self.version
    }

    /// Return the canonical archive file name.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{self}{ARCHIVE_EXTENSION}")
    }

    /// Return the canonical staging directory name.
    #[must_use]
    pub fn staging_dir_name(&self) -> String {
        self.to_string()
    }

    /// Return the archive path under `package_dir`.
    #[must_use]
    pub fn archive_path(&self, package_dir: &Path) -> PathBuf {
        package_dir.join(self.file_name())
    }

    /// Return the staging directory path under `extract_dir`.
    #[must_use]
    pub fn staging_path(&self, extract_dir: &Path) -> PathBuf {
        extract_dir.join(self.staging_dir_name())
    }
}

impl fmt::Display for ArchiveReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.application_name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn sample_reference() -> ArchiveReference {
        ArchiveReference::new("shop", SemVer::try_from("2.0.1-rc.1").expect("valid"))
    }

    #[rstest]
    fn file_name_appends_zip_extension(sample_reference: ArchiveReference) {
        assert_eq!(sample_reference.file_name(), "shop-2.0.1-rc.1.zip");
    }

    #[rstest]
    fn staging_name_matches_display(sample_reference: ArchiveReference) {
        assert_eq!(
            sample_reference.staging_dir_name(),
            sample_reference.to_string()
        );
    }

    #[rstest]
    fn paths_join_configured_directories(sample_reference: ArchiveReference) {
        assert_eq!(
            sample_reference.archive_path(Path::new("/srv/upload")),
            PathBuf::from("/srv/upload/shop-2.0.1-rc.1.zip")
        );
        assert_eq!(
            sample_reference.staging_path(Path::new("/srv/extract")),
            PathBuf::from("/srv/extract/shop-2.0.1-rc.1")
        );
    }

    #[rstest]
    fn accessors_return_components(sample_reference: ArchiveReference) {
        assert_eq!(sample_reference.application_name(), "shop");
        assert_eq!(sample_reference.version().as_str(), "2.0.1-rc.1");
    }
}
