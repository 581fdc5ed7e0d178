//! Filesystem primitives used by the swap controller and orchestrator.
//!
//! Every mutation the swap performs goes through [`DirectoryOps`], so tests
//! can inject failures at any single step while the rest of the sequence
//! runs against a real directory tree.

use log::trace;
use std::fs;
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use walkdir::WalkDir;

/// Directory operations the deployment core depends on.
#[cfg_attr(test, mockall::automock)]
pub trait DirectoryOps {
    /// Rename `from` to `to` in one filesystem operation.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the rename is refused.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Return whether anything exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Return whether `dir` is a directory with at least one entry.
    fn has_entries(&self, dir: &Path) -> bool;

    /// Confirm that files can be created in `dir`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised by the write probe.
    fn probe_writable(&self, dir: &Path) -> io::Result<()>;

    /// Recursively delete `path`, children before parents.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error; earlier deletions are not undone.
    fn remove_tree(&self, path: &Path) -> io::Result<()>;
}

/// [`DirectoryOps`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDirectoryOps;

impl DirectoryOps for StdDirectoryOps {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        trace!("rename {} -> {}", from.display(), to.display());
        fs::rename(from, to)
    }

    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn has_entries(&self, dir: &Path) -> bool {
        fs::read_dir(dir).is_ok_and(|mut entries| entries.next().is_some())
    }

    fn probe_writable(&self, dir: &Path) -> io::Result<()> {
        let probe = dir.join(probe_name());
        fs::write(&probe, b"stagehand write probe")?;
        if let Err(err) = fs::remove_file(&probe) {
            trace!("could not remove write probe {}: {err}", probe.display());
        }
        Ok(())
    }

    fn remove_tree(&self, path: &Path) -> io::Result<()> {
        for entry in WalkDir::new(path).contents_first(true) {
            let entry = entry.map_err(io::Error::other)?;
            if entry.file_type().is_dir() {
                fs::remove_dir(entry.path())?;
            } else {
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }
}

fn probe_name() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    format!(".stagehand-write-probe-{}-{nanos}", std::process::id())
}
