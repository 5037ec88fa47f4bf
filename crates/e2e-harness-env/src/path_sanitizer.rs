//! Search-path sanitizing.
//!
//! An entry is dropped when its parent directory carries the marker of
//! another environment manager: `pyvenv.cfg` for venv-style roots,
//! `conda-meta/` for conda-style roots. Everything else survives in its
//! original order, and the isolated environment's bin directory goes first.

use std::path::{Path, PathBuf};

use e2e_harness_core::Platform;

/// How a manager family marks its environment root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerMarker {
    /// A regular file directly under the root.
    File(&'static str),
    /// A directory directly under the root.
    Dir(&'static str),
}

impl ManagerMarker {
    fn present_in(&self, root: &Path) -> bool {
        match self {
            Self::File(name) => root.join(name).is_file(),
            Self::Dir(name) => root.join(name).is_dir(),
        }
    }
}

/// venv / virtualenv
pub const VENV_MARKER: ManagerMarker = ManagerMarker::File("pyvenv.cfg");
/// conda / mamba
pub const CONDA_MARKER: ManagerMarker = ManagerMarker::Dir("conda-meta");

pub const DEFAULT_MARKERS: &[ManagerMarker] = &[VENV_MARKER, CONDA_MARKER];

#[derive(Debug, Clone)]
pub struct PathSanitizer {
    markers: Vec<ManagerMarker>,
}

impl Default for PathSanitizer {
    fn default() -> Self {
        Self::new(DEFAULT_MARKERS.to_vec())
    }
}

impl PathSanitizer {
    pub fn new(markers: Vec<ManagerMarker>) -> Self {
        Self { markers }
    }

    /// Whether `entry` is the bin directory of some other manager's root.
    pub fn is_foreign(&self, entry: &str) -> bool {
        match Path::new(entry).parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                self.markers.iter().any(|m| m.present_in(parent))
            }
            _ => false,
        }
    }

    /// `bin_dir` followed by every entry that does not belong to another
    /// manager, in original order. Nothing is deduplicated.
    pub fn sanitize(&self, entries: &[String], bin_dir: &Path) -> Vec<String> {
        std::iter::once(bin_dir.to_string_lossy().to_string())
            .chain(
                entries
                    .iter()
                    .filter(|e| {
                        let foreign = self.is_foreign(e);
                        if foreign {
                            tracing::debug!(entry = %e, "Dropping foreign environment from PATH");
                        }
                        !foreign
                    })
                    .cloned(),
            )
            .collect()
    }

    /// `sanitize` over a raw search-path value, split and joined with the
    /// platform's separator.
    pub fn sanitize_value(&self, platform: &dyn Platform, value: &str, bin_dir: &Path) -> String {
        let entries = platform.split_path(value);
        platform.join_path(&self.sanitize(&entries, bin_dir))
    }

    /// Entries of `entries` that `sanitize` would drop.
    pub fn foreign_entries(&self, entries: &[String]) -> Vec<PathBuf> {
        entries
            .iter()
            .filter(|e| self.is_foreign(e))
            .map(PathBuf::from)
            .collect()
    }
}
