//! Atomic replacement of the live application directory.
//!
//! A swap promotes a staging directory to the live path in three renames:
//!
//! 1. live → backup (`<live>-backup-<YYYYmmddHHMMSS>`)
//! 2. staging → live
//! 3. delete the backup tree
//!
//! preceded by a writability guard on the live directory's parent. The
//! sequence is an explicit state machine: [`SwapState`] names each step and
//! every transition is a separate method with its own precondition, so each
//! can be exercised on its own.
//!
//! The only automatic remedy is a single restore rename (backup → live)
//! when promotion fails and the staging directory has vanished. Renames are
//! never retried. If the restore also fails the outcome is
//! [`SwapError::Panic`], which callers must surface distinctly.
//!
//! No lock is taken on any of the three paths. Two swaps racing on the same
//! live directory are not safe; the timestamped backup name only makes a
//! collision with a stale backup unlikely.

use crate::fs_ops::DirectoryOps;
use chrono::{DateTime, Local};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use thiserror::Error;

const BACKUP_INFIX: &str = "-backup-";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Steps of the swap sequence, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapState {
    /// Guard: the live directory's parent must accept new entries.
    PreCheck,
    /// Rename the live directory to the backup path.
    BackupLive,
    /// Rename the staging directory to the live path.
    PromoteStaged,
    /// Delete the backup tree.
    CleanupBackup,
    /// Terminal success state.
    Done,
}

/// Paths involved in one swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapPlan {
    live: PathBuf,
    staged: PathBuf,
    backup: PathBuf,
    parent: PathBuf,
}

impl SwapPlan {
    /// Plan a swap of `staged` into `live`, naming the backup after `at`.
    ///
    /// # Errors
    ///
    /// Returns [`SwapError::InvalidLivePath`] when `live` has no final
    /// component to derive a backup name from.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{Local, TimeZone};
    /// use std::path::Path;
    /// use stagehand::swap::SwapPlan;
    ///
    /// let at = Local.with_ymd_and_hms(2025, 8, 8, 16, 22, 52).unwrap();
    /// let plan = SwapPlan::new(Path::new("/srv/www/app"), Path::new("/srv/extract/app-1.0.0"), at)
    ///     .expect("valid live path");
    /// assert_eq!(plan.backup(), Path::new("/srv/www/app-backup-20250808162252"));
    /// ```
    pub fn new(live: &Path, staged: &Path, at: DateTime<Local>) -> Result<Self, SwapError> {
        let name = live
            .file_name()
            .ok_or_else(|| SwapError::InvalidLivePath {
                live: live.to_path_buf(),
            })?
            .to_string_lossy();
        let backup_name = format!(
            "{name}{BACKUP_INFIX}{}",
            at.format(BACKUP_TIMESTAMP_FORMAT)
        );
        let parent = match live.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Ok(Self {
            live: live.to_path_buf(),
            staged: staged.to_path_buf(),
            backup: live.with_file_name(backup_name),
            parent,
        })
    }

    /// The live directory path.
    #[must_use]
    pub fn live(&self) -> &Path {
        &self.live
    }

    /// The staging directory being promoted.
    #[must_use]
    pub fn staged(&self) -> &Path {
        &self.staged
    }

    /// The backup path for the current live directory.
    #[must_use]
    pub fn backup(&self) -> &Path {
        &self.backup
    }

    /// The directory that holds live and backup.
    #[must_use]
    pub fn parent(&self) -> &Path {
        &self.parent
    }
}

/// Successful swap outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapReport {
    /// Backup path used during the swap.
    pub backup: PathBuf,
    /// Set when the backup could not be deleted after promotion.
    pub cleanup_warning: Option<String>,
}

/// Failed swap outcomes.
///
/// Every variant except [`SwapError::Panic`] leaves the live slot either
/// untouched or recoverable from the retained backup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SwapError {
    /// The live path has no final component.
    #[error("the live directory '{}' cannot be swapped", live.display())]
    InvalidLivePath {
        /// The configured live path.
        live: PathBuf,
    },

    /// Pre-check failed; nothing was changed.
    #[error(
        "Cannot substitute the newly extracted app with the running website directory because the parent directory '{}' is not writeable",
        parent.display()
    )]
    ParentNotWritable {
        /// The directory that refused the write probe.
        parent: PathBuf,
        /// The probe's I/O error.
        reason: String,
    },

    /// Moving the live directory aside failed; nothing was changed.
    #[error(
        "failed to rename old website dir into the backup dir: '{}', please verify that everything still ok",
        backup.display()
    )]
    BackupFailed {
        /// The intended backup path.
        backup: PathBuf,
        /// The rename's I/O error.
        reason: String,
    },

    /// Promotion failed while the staging directory still exists.
    ///
    /// The live slot is empty; the previous release sits intact at
    /// `backup`. No further mutation was attempted.
    #[error(
        "rename failed but old website restorable from '{}', please verify that everything still ok",
        backup.display()
    )]
    Restorable {
        /// Where the previous release is kept.
        backup: PathBuf,
        /// The promote rename's I/O error.
        reason: String,
    },

    /// Promotion failed, the staging directory vanished, and the previous
    /// release was renamed back into place.
    #[error("deploy failed, rollback succeeded, please verify that everything still ok")]
    RolledBack {
        /// The promote rename's I/O error.
        reason: String,
    },

    /// Promotion and restore both failed; the live slot is in an undefined
    /// state and needs manual intervention.
    #[error("PANIC ERROR! rename failed and it was not possible to restore the old website!!")]
    Panic {
        /// The live path that could not be restored.
        live: PathBuf,
        /// Where the previous release was left, if still present.
        backup: PathBuf,
        /// The promote rename's I/O error.
        promote_reason: String,
        /// The restore rename's I/O error.
        restore_reason: String,
    },
}

impl SwapError {
    /// Return whether this outcome needs manual intervention.
    #[must_use]
    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panic { .. })
    }

    /// Underlying cause, for diagnostics after the headline message.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::InvalidLivePath { .. } => None,
            Self::ParentNotWritable { reason, .. }
            | Self::BackupFailed { reason, .. }
            | Self::Restorable { reason, .. }
            | Self::RolledBack { reason } => Some(reason.clone()),
            Self::Panic {
                backup,
                promote_reason,
                restore_reason,
                ..
            } => Some(format!(
                "promote failed: {promote_reason}; restore failed: {restore_reason}; previous release may remain at '{}'",
                backup.display()
            )),
        }
    }
}

/// Drives the swap state machine over a [`DirectoryOps`] implementation.
pub struct SwapController<'a> {
    ops: &'a dyn DirectoryOps,
}

impl<'a> SwapController<'a> {
    /// Create a controller mutating the filesystem through `ops`.
    #[must_use]
    pub fn new(ops: &'a dyn DirectoryOps) -> Self {
        Self { ops }
    }

    /// Replace `live` with `staged`, naming the backup after the current
    /// local time.
    ///
    /// # Errors
    ///
    /// Returns a [`SwapError`] describing where the sequence stopped.
    pub fn swap(&self, live: &Path, staged: &Path) -> Result<SwapReport, SwapError> {
        let plan = SwapPlan::new(live, staged, Local::now())?;
        self.run(&plan)
    }

    /// Run every transition of `plan` until a terminal state.
    ///
    /// # Errors
    ///
    /// Returns a [`SwapError`] describing where the sequence stopped.
    pub fn run(&self, plan: &SwapPlan) -> Result<SwapReport, SwapError> {
        let mut state = SwapState::PreCheck;
        let mut cleanup_warning = None;
        loop {
            debug!("swap state: {state:?}");
            state = match state {
                SwapState::PreCheck => self.pre_check(plan)?,
                SwapState::BackupLive => self.backup_live(plan)?,
                SwapState::PromoteStaged => self.promote_staged(plan)?,
                SwapState::CleanupBackup => {
                    cleanup_warning = self.cleanup_backup(plan);
                    SwapState::Done
                }
                SwapState::Done => break,
            };
        }
        info!(
            "promoted {} to {}",
            plan.staged.display(),
            plan.live.display()
        );
        Ok(SwapReport {
            backup: plan.backup.clone(),
            cleanup_warning,
        })
    }

    /// `PreCheck → BackupLive`. Pure guard, no mutation.
    ///
    /// # Errors
    ///
    /// Returns [`SwapError::ParentNotWritable`] when the write probe fails.
    pub fn pre_check(&self, plan: &SwapPlan) -> Result<SwapState, SwapError> {
        self.ops
            .probe_writable(&plan.parent)
            .map_err(|err| SwapError::ParentNotWritable {
                parent: plan.parent.clone(),
                reason: err.to_string(),
            })?;
        Ok(SwapState::BackupLive)
    }

    /// `BackupLive → PromoteStaged`.
    ///
    /// # Errors
    ///
    /// Returns [`SwapError::BackupFailed`] when the rename fails; the live
    /// directory is untouched.
    pub fn backup_live(&self, plan: &SwapPlan) -> Result<SwapState, SwapError> {
        self.ops
            .rename(&plan.live, &plan.backup)
            .map_err(|err| SwapError::BackupFailed {
                backup: plan.backup.clone(),
                reason: err.to_string(),
            })?;
        Ok(SwapState::PromoteStaged)
    }

    /// `PromoteStaged → CleanupBackup`, or one of the three failure
    /// outcomes.
    ///
    /// # Errors
    ///
    /// Returns [`SwapError::Restorable`] when the staging directory is still
    /// present, [`SwapError::RolledBack`] when it vanished and the restore
    /// succeeded, and [`SwapError::Panic`] when the restore failed too.
    pub fn promote_staged(&self, plan: &SwapPlan) -> Result<SwapState, SwapError> {
        let Err(promote_err) = self.ops.rename(&plan.staged, &plan.live) else {
            return Ok(SwapState::CleanupBackup);
        };
        let promote_reason = promote_err.to_string();
        warn!(
            "promoting {} failed: {promote_reason}",
            plan.staged.display()
        );

        if self.ops.exists(&plan.staged) {
            return Err(SwapError::Restorable {
                backup: plan.backup.clone(),
                reason: promote_reason,
            });
        }

        match self.ops.rename(&plan.backup, &plan.live) {
            Ok(()) => {
                warn!("restored {} from backup", plan.live.display());
                Err(SwapError::RolledBack {
                    reason: promote_reason,
                })
            }
            Err(restore_err) => {
                error!(
                    "restoring {} from {} failed: {restore_err}",
                    plan.live.display(),
                    plan.backup.display()
                );
                Err(SwapError::Panic {
                    live: plan.live.clone(),
                    backup: plan.backup.clone(),
                    promote_reason,
                    restore_reason: restore_err.to_string(),
                })
            }
        }
    }

    /// `CleanupBackup → Done`. Never fails the swap; returns a warning
    /// when the backup could not be deleted.
    #[must_use]
    pub fn cleanup_backup(&self, plan: &SwapPlan) -> Option<String> {
        match self.ops.remove_tree(&plan.backup) {
            Ok(()) => None,
            Err(err) => {
                let warning = format!(
                    "deploy succeeded but the backup directory '{}' could not be removed: {err}",
                    plan.backup.display()
                );
                warn!("{warning}");
                Some(warning)
            }
        }
    }
}

#[cfg(test)]
#[path = "swap_tests.rs"]
mod tests;
