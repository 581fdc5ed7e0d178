//! Archive extraction into version-named staging directories.
//!
//! Unpacks `.zip` packages entry by entry, recreating the archive's
//! directory structure and rejecting entries that would land outside the
//! destination. Extraction is not atomic: a failure part-way through can
//! leave a partially populated destination behind.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

/// Summary of a completed extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractReport {
    /// Number of regular files written.
    pub files: usize,
    /// Number of directory entries created.
    pub directories: usize,
}

/// Trait for extracting package archives, enabling test mocking.
///
/// # Examples
///
/// ```
/// use stagehand::artefact::extraction::ZipExtractor;
///
/// let extractor = ZipExtractor;
/// // Use extractor.extract(archive_path, dest_dir) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveExtractor {
    /// Extract the archive at `archive_path` into `dest_dir`.
    ///
    /// `dest_dir` is created if missing; its parent must already exist.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::Archive`] if the archive cannot be opened
    /// or decoded, [`ExtractionError::PathTraversal`] if an entry escapes
    /// the destination, and [`ExtractionError::Io`] on write failures.
    fn extract(&self, archive_path: &Path, dest_dir: &Path)
    -> Result<ExtractReport, ExtractionError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// I/O error while opening the archive or writing entries.
    #[error("extraction I/O error: {0}")]
    Io(#[from] io::Error),

    /// The archive is corrupt or uses an unsupported feature.
    #[error("invalid archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// An entry name attempts to escape the destination directory.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending entry name.
        path: String,
    },
}

/// Default extractor using the `zip` crate.
pub struct ZipExtractor;

impl ArchiveExtractor for ZipExtractor {
    fn extract(
        &self,
        archive_path: &Path,
        dest_dir: &Path,
    ) -> Result<ExtractReport, ExtractionError> {
        let file = File::open(archive_path)?;
        let mut archive = zip::ZipArchive::new(file)?;
        fs::create_dir_all(dest_dir)?;

        let mut report = ExtractReport::default();
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let entry_path = PathBuf::from(entry.name());
            validate_entry_path(&entry_path)?;

            let dest_path = dest_dir.join(&entry_path);
            if entry.is_dir() {
                fs::create_dir_all(&dest_path)?;
                report.directories += 1;
                continue;
            }

            if let Some(parent) = dest_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut output = File::create(&dest_path)?;
            io::copy(&mut entry, &mut output)?;
            apply_mode(&dest_path, entry.unix_mode())?;
            report.files += 1;
        }

        Ok(report)
    }
}

#[cfg(unix)]
fn apply_mode(path: &Path, mode: Option<u32>) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    match mode {
        Some(mode) => fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777)),
        None => Ok(()),
    }
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: Option<u32>) -> io::Result<()> {
    Ok(())
}

/// Validate that an entry path does not escape the destination directory
/// via `..` components or absolute paths.
fn validate_entry_path(path: &Path) -> Result<(), ExtractionError> {
    let escapes = path.is_absolute()
        || path.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
    if escapes {
        return Err(ExtractionError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{tree_listing, write_zip};
    use rstest::rstest;

    #[test]
    fn extract_recreates_nested_structure() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let archive_path = temp_dir.path().join("app-1.0.0.zip");
        write_zip(
            &archive_path,
            &[
                ("index.html", "home"),
                ("assets/", ""),
                ("assets/css/site.css", "body {}"),
                ("empty/", ""),
            ],
        );

        let dest_dir = temp_dir.path().join("app-1.0.0");
        let report = ZipExtractor
            .extract(&archive_path, &dest_dir)
            .expect("extract");

        assert_eq!(
            report,
            ExtractReport {
                files: 2,
                directories: 2
            }
        );
        assert_eq!(
            tree_listing(&dest_dir),
            vec![
                "assets",
                "assets/css",
                "assets/css/site.css",
                "empty",
                "index.html"
            ]
        );
        let css = fs::read_to_string(dest_dir.join("assets/css/site.css")).expect("read");
        assert_eq!(css, "body {}");
    }

    #[test]
    fn corrupt_archive_is_rejected() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let archive_path = temp_dir.path().join("bad.zip");
        fs::write(&archive_path, b"this is not a zip file").expect("write");

        let dest_dir = temp_dir.path().join("out");
        let result = ZipExtractor.extract(&archive_path, &dest_dir);
        assert!(matches!(result, Err(ExtractionError::Archive(_))));
        assert!(!dest_dir.exists(), "nothing written for an unreadable archive");
    }

    #[test]
    fn missing_archive_is_an_io_error() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let result = ZipExtractor.extract(&temp_dir.path().join("absent.zip"), temp_dir.path());
        assert!(matches!(result, Err(ExtractionError::Io(_))));
    }

    #[test]
    fn traversal_entry_aborts_extraction() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let archive_path = temp_dir.path().join("evil.zip");
        write_zip(&archive_path, &[("../escape.txt", "gotcha")]);

        let dest_dir = temp_dir.path().join("out");
        let result = ZipExtractor.extract(&archive_path, &dest_dir);
        assert!(matches!(result, Err(ExtractionError::PathTraversal { .. })));
        assert!(!temp_dir.path().join("escape.txt").exists());
    }

    #[rstest]
    #[case::parent_dir("../escape.txt")]
    #[case::nested_parent("foo/../../escape.txt")]
    #[case::absolute("/etc/passwd")]
    fn rejects_escaping_paths(#[case] bad_path: &str) {
        let result = validate_entry_path(Path::new(bad_path));
        assert!(
            matches!(result, Err(ExtractionError::PathTraversal { .. })),
            "expected PathTraversal for {bad_path}"
        );
    }

    #[rstest]
    #[case::flat("index.html")]
    #[case::nested("assets/js/app.js")]
    #[case::current_dir("./index.html")]
    fn accepts_contained_paths(#[case] path: &str) {
        assert!(validate_entry_path(Path::new(path)).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn unix_modes_are_preserved() {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;
        use zip::write::SimpleFileOptions;

        let temp_dir = tempfile::tempdir().expect("temp dir");
        let archive_path = temp_dir.path().join("modes.zip");
        let file = File::create(&archive_path).expect("create");
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file(
                "bin/run.sh",
                SimpleFileOptions::default().unix_permissions(0o755),
            )
            .expect("start file");
        writer.write_all(b"#!/bin/sh\n").expect("write");
        writer.finish().expect("finish");

        let dest_dir = temp_dir.path().join("out");
        ZipExtractor
            .extract(&archive_path, &dest_dir)
            .expect("extract");
        let mode = fs::metadata(dest_dir.join("bin/run.sh"))
            .expect("metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}
