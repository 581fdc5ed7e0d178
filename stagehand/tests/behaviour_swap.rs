//! Behaviour-driven tests for the live directory swap.
//!
//! Failures are injected through a [`DirectoryOps`] wrapper that delegates
//! to the real filesystem except at the step under test.

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use stagehand::fs_ops::{DirectoryOps, StdDirectoryOps};
use stagehand::swap::{SwapController, SwapError, SwapReport};
use stagehand::test_utils::{populate, tree_listing};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Fault injection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum PromoteFault {
    #[default]
    None,
    Refuse,
    LoseStaging,
}

#[derive(Debug, Default)]
struct FaultyOps {
    staged: PathBuf,
    refuse_probe: bool,
    promote: PromoteFault,
    refuse_restore: bool,
    refuse_cleanup: bool,
}

fn injected() -> io::Error {
    io::Error::new(io::ErrorKind::PermissionDenied, "injected failure")
}

fn is_backup(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().contains("-backup-"))
}

impl DirectoryOps for FaultyOps {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        if from == self.staged {
            match self.promote {
                PromoteFault::None => {}
                PromoteFault::Refuse => return Err(injected()),
                PromoteFault::LoseStaging => {
                    StdDirectoryOps.remove_tree(from)?;
                    return Err(injected());
                }
            }
        }
        if is_backup(from) && self.refuse_restore {
            return Err(injected());
        }
        StdDirectoryOps.rename(from, to)
    }

    fn exists(&self, path: &Path) -> bool {
        StdDirectoryOps.exists(path)
    }

    fn has_entries(&self, dir: &Path) -> bool {
        StdDirectoryOps.has_entries(dir)
    }

    fn probe_writable(&self, dir: &Path) -> io::Result<()> {
        if self.refuse_probe {
            return Err(injected());
        }
        StdDirectoryOps.probe_writable(dir)
    }

    fn remove_tree(&self, path: &Path) -> io::Result<()> {
        if is_backup(path) && self.refuse_cleanup {
            return Err(injected());
        }
        StdDirectoryOps.remove_tree(path)
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

#[derive(Default)]
struct SwapWorld {
    temp: Option<TempDir>,
    live: PathBuf,
    ops: FaultyOps,
    result: Option<Result<SwapReport, SwapError>>,
}

impl SwapWorld {
    fn www(&self) -> &Path {
        self.live.parent().expect("www dir")
    }

    fn backups(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.www())
            .expect("read www")
            .map(|entry| entry.expect("dir entry").path())
            .filter(|path| is_backup(path))
            .collect()
    }

    fn error(&self) -> &SwapError {
        match self.result.as_ref().expect("swap ran") {
            Ok(report) => panic!("expected a failed swap, got {report:?}"),
            Err(err) => err,
        }
    }
}

#[fixture]
fn world() -> SwapWorld {
    SwapWorld::default()
}

const PREVIOUS: &[&str] = &["index.html", "old.css"];

// ---------------------------------------------------------------------------
// Step definitions
// ---------------------------------------------------------------------------

#[given("a live release and a staged release")]
fn given_live_and_staged(world: &mut SwapWorld) {
    let temp = tempfile::tempdir().expect("temp dir");
    let live = temp.path().join("www").join("app");
    let staged = temp.path().join("extract").join("app-1.2.3");
    populate(&live, PREVIOUS);
    populate(&staged, &["index.html", "new.css"]);
    world.live = live;
    world.ops.staged = staged;
    world.temp = Some(temp);
}

#[given("the live parent refuses writes")]
fn given_parent_refuses(world: &mut SwapWorld) {
    world.ops.refuse_probe = true;
}

#[given("promoting the staged release is refused")]
fn given_promote_refused(world: &mut SwapWorld) {
    world.ops.promote = PromoteFault::Refuse;
}

#[given("the staging directory vanishes when promoting")]
fn given_staging_vanishes(world: &mut SwapWorld) {
    world.ops.promote = PromoteFault::LoseStaging;
}

#[given("restoring the backup fails")]
fn given_restore_fails(world: &mut SwapWorld) {
    world.ops.refuse_restore = true;
}

#[given("deleting the backup fails")]
fn given_cleanup_fails(world: &mut SwapWorld) {
    world.ops.refuse_cleanup = true;
}

#[when("the swap runs")]
fn when_swap_runs(world: &mut SwapWorld) {
    let result = SwapController::new(&world.ops).swap(&world.live, &world.ops.staged);
    world.result = Some(result);
}

#[then("the swap succeeds")]
fn then_swap_succeeds(world: &mut SwapWorld) {
    let report = world
        .result
        .as_ref()
        .expect("swap ran")
        .as_ref()
        .expect("swap succeeded");
    assert!(report.cleanup_warning.is_none());
}

#[then("the swap completes with a cleanup warning")]
fn then_swap_warns(world: &mut SwapWorld) {
    let report = world
        .result
        .as_ref()
        .expect("swap ran")
        .as_ref()
        .expect("swap succeeded");
    let warning = report.cleanup_warning.as_deref().expect("cleanup warning");
    assert!(warning.starts_with("deploy succeeded but the backup directory '"));
    assert!(report.backup.is_dir(), "backup kept after failed cleanup");
}

#[then("the swap fails with \"{prefix}\"")]
fn then_swap_fails_with(world: &mut SwapWorld, prefix: String) {
    let err = world.error();
    assert!(!err.is_panic());
    assert!(
        err.to_string().starts_with(&prefix),
        "unexpected message: {err}"
    );
}

#[then("the swap ends in a panic")]
fn then_swap_panics(world: &mut SwapWorld) {
    let err = world.error();
    assert!(err.is_panic(), "expected a panic outcome, got {err:?}");
    assert!(!world.live.exists());
}

#[then("the live directory holds the staged release")]
fn then_live_is_staged(world: &mut SwapWorld) {
    assert_eq!(tree_listing(&world.live), vec!["index.html", "new.css"]);
    assert!(!world.ops.staged.exists());
}

#[then("the live directory holds the previous release")]
fn then_live_is_previous(world: &mut SwapWorld) {
    assert_eq!(tree_listing(&world.live), PREVIOUS);
    assert!(world.backups().is_empty());
}

#[then("the backup directory holds the previous release")]
fn then_backup_is_previous(world: &mut SwapWorld) {
    let backups = world.backups();
    assert_eq!(backups.len(), 1, "expected one backup, found {backups:?}");
    let backup = backups.first().expect("checked above");
    assert_eq!(tree_listing(backup), PREVIOUS);
}

#[then("no backup directory remains")]
fn then_no_backup(world: &mut SwapWorld) {
    assert!(world.backups().is_empty());
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(path = "tests/features/swap.feature", name = "Swap a staged release into place")]
fn scenario_swap_succeeds(world: SwapWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/swap.feature",
    name = "Refuse to swap into an unwritable parent"
)]
fn scenario_unwritable_parent(world: SwapWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/swap.feature",
    name = "Promote fails while the staging directory remains"
)]
fn scenario_promote_restorable(world: SwapWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/swap.feature",
    name = "Promote fails after the staging directory vanished"
)]
fn scenario_promote_rolled_back(world: SwapWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/swap.feature",
    name = "Restore fails after a failed promote"
)]
fn scenario_restore_panics(world: SwapWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/swap.feature",
    name = "Backup cleanup fails after a successful promote"
)]
fn scenario_cleanup_warning(world: SwapWorld) {
    let _ = world;
}
