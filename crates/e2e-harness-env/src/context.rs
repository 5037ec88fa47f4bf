//! The record describing the active isolated environment.

use std::path::{Path, PathBuf};

use serde::Serialize;

use e2e_harness_core::config::env_keys::child;
use e2e_harness_core::{AmbientEnv, EnvMap, Platform};

use crate::path_sanitizer::PathSanitizer;

/// Who is responsible for deleting the environment root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ownership {
    /// Created by this run; teardown deletes it.
    Owned,
    /// Supplied from outside (`E2E_VENV`); never deleted.
    External,
}

/// Created once per suite run by the provisioner. `scratch_dir` is replaced
/// per scenario; everything else stays fixed until teardown.
#[derive(Debug, Clone)]
pub struct EnvironmentContext {
    pub isolated_root: PathBuf,
    pub installer_path: PathBuf,
    pub interpreter_path: PathBuf,
    pub target_binary_path: PathBuf,
    /// Environment for every child process of the suite.
    pub process_env: EnvMap,
    pub scratch_dir: Option<PathBuf>,
    pub project_name: String,
    pub ownership: Ownership,
}

impl EnvironmentContext {
    /// Derive a context for `root` from the ambient snapshot.
    ///
    /// The ambient mapping is cloned; its search-path variable is replaced by
    /// the sanitized one and the installer is pointed at `installer_config`.
    pub fn new(
        platform: &dyn Platform,
        sanitizer: &PathSanitizer,
        ambient: &AmbientEnv,
        root: &Path,
        target_binary: &str,
        installer_config: &Path,
        ownership: Ownership,
    ) -> Self {
        let bin_dir = platform.bin_dir(root);
        let path_value = sanitizer.sanitize_value(
            platform,
            ambient.path_value(platform).unwrap_or_default(),
            &bin_dir,
        );

        let mut process_env = ambient.to_env_map();
        // Drop every spelling of the path key before inserting ours.
        process_env.retain(|k, _| !platform.is_path_key(k));
        process_env.insert("PATH".to_string(), path_value);
        process_env.insert(
            child::PIP_CONFIG_FILE.to_string(),
            installer_config.to_string_lossy().to_string(),
        );
        process_env.insert(
            child::VIRTUAL_ENV.to_string(),
            root.to_string_lossy().to_string(),
        );
        process_env.remove(child::PYTHONHOME);

        Self {
            isolated_root: root.to_path_buf(),
            installer_path: platform.executable(root, "pip"),
            interpreter_path: platform.executable(root, "python"),
            target_binary_path: platform.executable(root, target_binary),
            process_env,
            scratch_dir: None,
            project_name: String::new(),
            ownership,
        }
    }

    pub fn is_owned(&self) -> bool {
        self.ownership == Ownership::Owned
    }

    pub fn path_var(&self) -> Option<&str> {
        self.process_env.get("PATH").map(String::as_str)
    }

    pub fn set_project_name(&mut self, name: impl Into<String>) {
        self.project_name = name.into();
    }

    pub fn interpreter(&self) -> String {
        self.interpreter_path.to_string_lossy().to_string()
    }

    pub fn target_binary(&self) -> String {
        self.target_binary_path.to_string_lossy().to_string()
    }
}
