//! Configuration structs grouped by concern, loaded from an ambient snapshot.

use super::env_keys::{self, container, install, observability as obv_keys};
use super::loader::{env_bool, env_list, env_optional, env_or};
use crate::ambient::AmbientEnv;
use serde::Serialize;
use std::path::PathBuf;

/// Requirements installed alongside the package under test. pip is capped
/// below 21.3 because newer releases break the pinned pip-tools.
pub const DEFAULT_BUILD_REQUIREMENTS: &[&str] = &["pip>=20.0,<21.3", "setuptools>=38.0", "wheel"];

pub const DEFAULT_PLUGIN_INSTALL: &[&str] = &["setup.py", "install"];

pub const DEFAULT_CONTAINER_RUNTIME: &str = "docker";

/// Everything the suite needs to provision, install and clean up.
#[derive(Debug, Clone, Serialize)]
pub struct HarnessConfig {
    /// Externally supplied environment root (`E2E_VENV`). Reused, never deleted.
    pub venv_override: Option<PathBuf>,
    /// Log every command line and its output, not only failures.
    pub verbose: bool,
    /// Working directory for installation commands.
    pub project_dir: PathBuf,
    pub package_spec: String,
    pub build_requirements: Vec<String>,
    /// Interpreter arguments for the plugin registration step. `None` skips it.
    pub plugin_install: Option<Vec<String>>,
    /// Executable name of the tool under test inside the environment.
    pub target_binary: String,
    /// Interpreter used to create a fresh environment. Resolved on PATH when unset.
    pub base_python: Option<PathBuf>,
    pub container_runtime: String,
    pub project_name: String,
}

impl HarnessConfig {
    pub fn from_env(env: &AmbientEnv) -> Self {
        let project_dir = env_optional(env, install::E2E_PROJECT_DIR, &[])
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        let target_binary = env_optional(env, install::E2E_TARGET_BIN, install::TARGET_BIN_ALIASES)
            .unwrap_or_else(|| default_target_binary(&project_dir));

        let plugin_install = match env_list(env, install::E2E_PLUGIN_INSTALL, &[]) {
            Some(args) if args.len() == 1 && args[0].eq_ignore_ascii_case("none") => None,
            Some(args) => Some(args),
            None => Some(DEFAULT_PLUGIN_INSTALL.iter().map(|s| s.to_string()).collect()),
        };

        Self {
            venv_override: env_optional(env, env_keys::E2E_VENV, &[]).map(PathBuf::from),
            verbose: env_bool(
                env,
                obv_keys::E2E_HARNESS_VERBOSE,
                obv_keys::VERBOSE_ALIASES,
                false,
            ),
            package_spec: env_or(env, install::E2E_PACKAGE_SPEC, &[], || ".".to_string()),
            build_requirements: env_list(env, install::E2E_BUILD_REQUIREMENTS, &[])
                .unwrap_or_else(|| {
                    DEFAULT_BUILD_REQUIREMENTS
                        .iter()
                        .map(|s| s.to_string())
                        .collect()
                }),
            plugin_install,
            target_binary,
            base_python: env_optional(env, install::E2E_PYTHON, install::PYTHON_ALIASES)
                .map(PathBuf::from),
            container_runtime: env_or(
                env,
                container::E2E_CONTAINER_RUNTIME,
                container::CONTAINER_RUNTIME_ALIASES,
                || DEFAULT_CONTAINER_RUNTIME.to_string(),
            ),
            project_name: env_optional(env, container::E2E_PROJECT_NAME, &[]).unwrap_or_default(),
            project_dir,
        }
    }

    /// Point at another project directory. A target binary derived from the
    /// old directory name follows the new one.
    pub fn with_project_dir(mut self, dir: PathBuf) -> Self {
        if self.target_binary == default_target_binary(&self.project_dir) {
            self.target_binary = default_target_binary(&dir);
        }
        self.project_dir = dir;
        self
    }
}

/// The tool under test is assumed to be named after its project directory.
/// Relative forms like `.` or `..` are resolved first; they have no file name.
fn default_target_binary(project_dir: &std::path::Path) -> String {
    project_dir
        .canonicalize()
        .or_else(|_| std::path::absolute(project_dir))
        .unwrap_or_else(|_| project_dir.to_path_buf())
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Logging configuration: quiet, log_level, log_json, audit_log
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
    pub audit_log: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_env(env: &AmbientEnv) -> Self {
        Self {
            quiet: env_bool(env, obv_keys::E2E_HARNESS_QUIET, &[], false),
            log_level: env_or(
                env,
                obv_keys::E2E_HARNESS_LOG_LEVEL,
                obv_keys::LOG_LEVEL_ALIASES,
                || "e2e_harness=info,e2e_harness_env=info,e2e_harness_core=info".to_string(),
            ),
            log_json: env_bool(env, obv_keys::E2E_HARNESS_LOG_JSON, &[], false),
            audit_log: env_optional(env, obv_keys::E2E_HARNESS_AUDIT_LOG, &[]),
        }
    }
}
