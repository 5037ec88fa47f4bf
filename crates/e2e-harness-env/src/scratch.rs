//! Per-scenario scratch directories and permission-safe tree removal.

use std::fs;
use std::path::{Path, PathBuf};

use e2e_harness_core::Platform;
use walkdir::WalkDir;

use crate::context::EnvironmentContext;
use crate::error::{HarnessError, Result};

const SCRATCH_PREFIX: &str = "e2e-scenario-";

/// Hands out a fresh scratch directory before each scenario and removes it after.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioIsolation<'a> {
    platform: &'a dyn Platform,
}

impl<'a> ScenarioIsolation<'a> {
    pub fn new(platform: &'a dyn Platform) -> Self {
        Self { platform }
    }

    /// Create an empty temporary directory and record it on the context.
    pub fn acquire(&self, ctx: &mut EnvironmentContext) -> Result<PathBuf> {
        let dir = self.create_dir()?;
        if let Some(stale) = ctx.scratch_dir.replace(dir.clone()) {
            tracing::warn!(path = %stale.display(), "Previous scratch dir was never released");
            self.release(&stale)?;
        }
        Ok(dir)
    }

    /// Remove the context's scratch directory, if any, and clear it.
    pub fn release_current(&self, ctx: &mut EnvironmentContext) -> Result<()> {
        match ctx.scratch_dir.take() {
            Some(dir) => self.release(&dir),
            None => Ok(()),
        }
    }

    /// Recursively delete `path`. Missing paths are fine.
    pub fn release(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        remove_tree(self.platform, path)
    }

    fn create_dir(&self) -> Result<PathBuf> {
        let dir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir()
            .map_err(|e| HarnessError::io("Create scratch dir", e))?;
        let path = dir.keep();
        tracing::debug!(path = %path.display(), "Acquired scratch dir");
        Ok(path)
    }
}

/// Delete a directory tree.
///
/// Where the platform refuses to delete read-only files, write permission is
/// restored on every file first, walking bottom-up. A failure after that is
/// returned as [`HarnessError::Cleanup`].
pub fn remove_tree(platform: &dyn Platform, top: &Path) -> Result<()> {
    if platform.clears_readonly_before_delete() {
        clear_readonly(top);
    }
    fs::remove_dir_all(top).map_err(|source| HarnessError::Cleanup {
        path: top.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %top.display(), "Removed tree");
    Ok(())
}

fn clear_readonly(top: &Path) {
    for entry in WalkDir::new(top)
        .contents_first(true)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let Ok(meta) = fs::metadata(path) else {
            continue;
        };
        let mut perms = meta.permissions();
        if perms.readonly() {
            #[allow(clippy::permissions_set_readonly_false)]
            perms.set_readonly(false);
            if let Err(e) = fs::set_permissions(path, perms) {
                tracing::debug!(path = %path.display(), "Could not clear read-only bit: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Ownership;
    use crate::path_sanitizer::PathSanitizer;
    use e2e_harness_core::platform::{Posix, Windows};
    use e2e_harness_core::AmbientEnv;

    fn ctx() -> EnvironmentContext {
        let root = Path::new("/tmp/iso");
        EnvironmentContext::new(
            &Posix,
            &PathSanitizer::default(),
            &AmbientEnv::default(),
            root,
            "t",
            &root.join("pip.conf"),
            Ownership::Owned,
        )
    }

    fn populate_readonly(dir: &Path) {
        let nested = dir.join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        let file = nested.join("locked.txt");
        fs::write(&file, "x").unwrap();
        let mut perms = fs::metadata(&file).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&file, perms).unwrap();
        fs::write(dir.join("top.txt"), "y").unwrap();
    }

    #[test]
    fn test_acquire_creates_empty_dir_and_records_it() {
        let iso = ScenarioIsolation::new(&Posix);
        let mut ctx = ctx();
        let dir = iso.acquire(&mut ctx).unwrap();
        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
        assert_eq!(ctx.scratch_dir.as_deref(), Some(dir.as_path()));
        iso.release_current(&mut ctx).unwrap();
        assert!(!dir.exists());
        assert_eq!(ctx.scratch_dir, None);
    }

    #[test]
    fn test_each_acquire_is_fresh() {
        let iso = ScenarioIsolation::new(&Posix);
        let mut ctx = ctx();
        let first = iso.acquire(&mut ctx).unwrap();
        let second = iso.acquire(&mut ctx).unwrap();
        assert_ne!(first, second);
        assert!(!first.exists(), "replaced scratch dir should be cleaned");
        iso.release_current(&mut ctx).unwrap();
    }

    #[test]
    fn test_release_with_readonly_file() {
        let iso = ScenarioIsolation::new(e2e_harness_core::platform::host());
        let mut ctx = ctx();
        let dir = iso.acquire(&mut ctx).unwrap();
        populate_readonly(&dir);
        iso.release_current(&mut ctx).unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn test_readonly_fixup_path() {
        // Exercise the permission fix-up regardless of host.
        let tmp = tempfile::tempdir().unwrap();
        let top = tmp.path().join("tree");
        populate_readonly(&top);
        remove_tree(&Windows, &top).unwrap();
        assert!(!top.exists());
    }

    #[test]
    fn test_clear_readonly_restores_write_on_every_file() {
        let tmp = tempfile::tempdir().unwrap();
        let top = tmp.path().join("tree");
        populate_readonly(&top);
        let locked = top.join("a").join("b").join("locked.txt");
        assert!(fs::metadata(&locked).unwrap().permissions().readonly());

        clear_readonly(&top);

        for entry in WalkDir::new(&top) {
            let entry = entry.unwrap();
            if entry.file_type().is_file() {
                assert!(
                    !fs::metadata(entry.path()).unwrap().permissions().readonly(),
                    "{} is still read-only",
                    entry.path().display()
                );
            }
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_clear_readonly_does_not_follow_symlinks() {
        let tmp = tempfile::tempdir().unwrap();
        let outside = tmp.path().join("outside.txt");
        fs::write(&outside, "keep").unwrap();
        let mut perms = fs::metadata(&outside).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&outside, perms).unwrap();

        let top = tmp.path().join("tree");
        fs::create_dir_all(&top).unwrap();
        std::os::unix::fs::symlink(&outside, top.join("link.txt")).unwrap();

        clear_readonly(&top);
        assert!(fs::metadata(&outside).unwrap().permissions().readonly());

        remove_tree(&Windows, &top).unwrap();
        assert!(outside.exists());
    }

    #[test]
    fn test_release_missing_path_is_noop() {
        let tmp = tempfile::tempdir().unwrap();
        let gone = tmp.path().join("never-created");
        ScenarioIsolation::new(&Posix).release(&gone).unwrap();
    }

    #[test]
    fn test_remove_tree_failure_is_cleanup_error() {
        let tmp = tempfile::tempdir().unwrap();
        let gone = tmp.path().join("never-created");
        let err = remove_tree(&Posix, &gone).unwrap_err();
        assert!(matches!(err, HarnessError::Cleanup { .. }));
    }
}
