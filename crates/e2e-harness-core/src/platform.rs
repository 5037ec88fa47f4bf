//! Platform capability: the only place that knows how the host lays out a
//! virtual environment and how it deletes files.
//!
//! Callers take `&dyn Platform` and never branch on the host OS themselves.
//! `host()` picks the implementation for the running process; tests can use
//! either implementation directly.

use std::path::{Path, PathBuf};

pub trait Platform: Send + Sync + std::fmt::Debug {
    /// Name for logging and diagnostics.
    fn name(&self) -> &'static str;

    /// Directory under an environment root holding its executables.
    fn bin_dir_name(&self) -> &'static str;

    /// Separator between entries of the search-path variable.
    fn path_separator(&self) -> char;

    /// Suffix appended to executable names.
    fn exe_suffix(&self) -> &'static str;

    /// Whether recursive deletion fails on read-only files unless their
    /// write permission is restored first.
    fn clears_readonly_before_delete(&self) -> bool;

    /// Whether `key` names the search-path variable.
    fn is_path_key(&self, key: &str) -> bool;

    fn bin_dir(&self, root: &Path) -> PathBuf {
        root.join(self.bin_dir_name())
    }

    fn executable(&self, root: &Path, name: &str) -> PathBuf {
        self.bin_dir(root)
            .join(format!("{}{}", name, self.exe_suffix()))
    }

    /// Split a search-path value into entries. An empty value has no entries.
    fn split_path(&self, value: &str) -> Vec<String> {
        if value.is_empty() {
            return Vec::new();
        }
        value
            .split(self.path_separator())
            .map(String::from)
            .collect()
    }

    fn join_path(&self, entries: &[String]) -> String {
        entries.join(&self.path_separator().to_string())
    }
}

/// Linux, macOS and other Unix-likes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Posix;

impl Platform for Posix {
    fn name(&self) -> &'static str {
        "posix"
    }

    fn bin_dir_name(&self) -> &'static str {
        "bin"
    }

    fn path_separator(&self) -> char {
        ':'
    }

    fn exe_suffix(&self) -> &'static str {
        ""
    }

    fn clears_readonly_before_delete(&self) -> bool {
        false
    }

    fn is_path_key(&self, key: &str) -> bool {
        key == "PATH"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Windows;

impl Platform for Windows {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn bin_dir_name(&self) -> &'static str {
        "Scripts"
    }

    fn path_separator(&self) -> char {
        ';'
    }

    fn exe_suffix(&self) -> &'static str {
        ".exe"
    }

    fn clears_readonly_before_delete(&self) -> bool {
        true
    }

    fn is_path_key(&self, key: &str) -> bool {
        key.eq_ignore_ascii_case("PATH")
    }
}

/// Platform implementation for the running host.
pub fn host() -> &'static dyn Platform {
    #[cfg(windows)]
    return &Windows;
    #[cfg(not(windows))]
    return &Posix;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executable_layout() {
        let root = Path::new("/envs/e2e");
        assert_eq!(
            Posix.executable(root, "python"),
            PathBuf::from("/envs/e2e/bin/python")
        );
        assert_eq!(
            Windows.executable(root, "python"),
            root.join("Scripts").join("python.exe")
        );
    }

    #[test]
    fn test_split_join_roundtrip_keeps_empty_segments() {
        let entries = Posix.split_path("/a::/b");
        assert_eq!(entries, vec!["/a", "", "/b"]);
        assert_eq!(Posix.join_path(&entries), "/a::/b");
    }

    #[test]
    fn test_split_empty_value() {
        assert!(Posix.split_path("").is_empty());
        assert!(Windows.split_path("").is_empty());
    }

    #[test]
    fn test_host_matches_target() {
        if cfg!(windows) {
            assert_eq!(host().name(), "windows");
        } else {
            assert_eq!(host().name(), "posix");
        }
    }
}
