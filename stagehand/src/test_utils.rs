//! Shared fixtures for unit and behaviour tests.
//!
//! Builders here panic on failure; they are only compiled for tests and the
//! `test-support` feature.

use crate::artefact::digest::{HashAlgorithm, digest_reader};
use crate::config::DeployConfig;
use camino::Utf8PathBuf;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;

/// A throwaway deployment layout rooted in a temporary directory.
///
/// Creates `upload/`, `extract/`, and `www/live/` below the root, with the
/// live directory holding `index.html`.
pub struct DeploymentLayout {
    /// Root temporary directory; removed on drop.
    pub root: tempfile::TempDir,
    /// Configuration pointing at the layout's directories.
    pub config: DeployConfig,
}

impl DeploymentLayout {
    /// Build a layout for `application_name` using the xxh128 algorithm.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directories cannot be created.
    #[must_use]
    pub fn new(application_name: &str) -> Self {
        let root = tempfile::tempdir().expect("temp dir");
        let base = Utf8PathBuf::try_from(root.path().to_path_buf()).expect("UTF-8 temp path");
        let package_dir = base.join("upload");
        let extract_dir = base.join("extract");
        let live_dir = base.join("www").join("live");
        for dir in [&package_dir, &extract_dir, &live_dir] {
            fs::create_dir_all(dir).expect("create layout directory");
        }
        fs::write(live_dir.join("index.html"), b"old release").expect("seed live dir");

        let config = DeployConfig {
            application_name: application_name.to_owned(),
            secret: "test-secret".to_owned(),
            package_dir,
            extract_dir,
            live_dir,
            hash_algorithm: HashAlgorithm::Xxh128.name().to_owned(),
            hash_chunk_size: 64,
            auth_failure_delay_ms: 0,
        };
        Self { root, config }
    }

    /// Write a zip archive for `version` into the package directory and
    /// return its xxh128 digest.
    ///
    /// # Panics
    ///
    /// Panics if the archive cannot be written or read back.
    #[must_use]
    pub fn upload<C: AsRef<[u8]>>(&self, version: &str, entries: &[(&str, C)]) -> String {
        let path = self
            .config
            .package_dir
            .as_std_path()
            .join(format!("{}-{version}.zip", self.config.application_name));
        write_zip(&path, entries);
        file_digest(&path, HashAlgorithm::Xxh128)
    }

    /// Return the staging directory path for `version`.
    #[must_use]
    pub fn staging_path(&self, version: &str) -> PathBuf {
        self.config
            .extract_dir
            .as_std_path()
            .join(format!("{}-{version}", self.config.application_name))
    }

    /// Return the live directory path.
    #[must_use]
    pub fn live_path(&self) -> &Path {
        self.config.live_dir.as_std_path()
    }
}

/// Write a zip archive at `path`.
///
/// Entry names ending in `/` become directory entries.
///
/// # Panics
///
/// Panics if the archive cannot be written.
pub fn write_zip<C: AsRef<[u8]>>(path: &Path, entries: &[(&str, C)]) {
    let file = fs::File::create(path).expect("create archive");
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, contents) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).expect("add directory");
        } else {
            writer.start_file(*name, options).expect("start file");
            writer.write_all(contents.as_ref()).expect("write entry");
        }
    }
    writer.finish().expect("finish archive");
}

/// Hash the file at `path` in one pass.
///
/// # Panics
///
/// Panics if the file cannot be read.
#[must_use]
pub fn file_digest(path: &Path, algorithm: HashAlgorithm) -> String {
    let bytes = fs::read(path).expect("read file");
    digest_reader(bytes.as_slice(), algorithm, bytes.len()).expect("digest")
}

/// Return every path under `dir`, relative and sorted, with `/` separators.
///
/// # Panics
///
/// Panics if the tree cannot be walked.
#[must_use]
pub fn tree_listing(dir: &Path) -> Vec<String> {
    let mut listing: Vec<String> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .map(|entry| {
            let entry = entry.expect("walk entry");
            let relative = entry.path().strip_prefix(dir).expect("entry under root");
            relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect();
    listing.sort();
    listing
}

/// Populate `dir` with files named `names`, each holding its own name.
///
/// # Panics
///
/// Panics if the directory or files cannot be created.
pub fn populate(dir: &Path, names: &[&str]) {
    fs::create_dir_all(dir).expect("create directory");
    for name in names {
        fs::write(dir.join(name), name.as_bytes()).expect("write file");
    }
}
