//! Environment variable keys and their aliases.
//!
//! Primary keys use the `E2E_HARNESS_*` / `E2E_*` prefix. Aliases cover the
//! names older CI pipelines exported.

/// Pre-existing environment root to reuse. Never deleted by teardown.
pub const E2E_VENV: &str = "E2E_VENV";

/// Isolated environment and the tool under test
pub mod install {
    pub const E2E_PROJECT_DIR: &str = "E2E_PROJECT_DIR";

    pub const E2E_PACKAGE_SPEC: &str = "E2E_PACKAGE_SPEC";

    /// Whitespace separated requirement specifiers installed with the package.
    pub const E2E_BUILD_REQUIREMENTS: &str = "E2E_BUILD_REQUIREMENTS";

    /// Whitespace separated interpreter arguments; `none` disables the step.
    pub const E2E_PLUGIN_INSTALL: &str = "E2E_PLUGIN_INSTALL";

    pub const E2E_TARGET_BIN: &str = "E2E_TARGET_BIN";
    pub const TARGET_BIN_ALIASES: &[&str] = &["E2E_TARGET_BINARY"];

    /// Interpreter used to create a fresh environment.
    pub const E2E_PYTHON: &str = "E2E_PYTHON";
    pub const PYTHON_ALIASES: &[&str] = &["E2E_BASE_PYTHON"];
}

/// Container engine
pub mod container {
    pub const E2E_CONTAINER_RUNTIME: &str = "E2E_CONTAINER_RUNTIME";
    pub const CONTAINER_RUNTIME_ALIASES: &[&str] = &["E2E_DOCKER"];

    pub const E2E_PROJECT_NAME: &str = "E2E_PROJECT_NAME";
}

/// Logging and diagnostics
pub mod observability {
    pub const E2E_HARNESS_VERBOSE: &str = "E2E_HARNESS_VERBOSE";
    pub const VERBOSE_ALIASES: &[&str] = &["E2E_VERBOSE"];

    pub const E2E_HARNESS_QUIET: &str = "E2E_HARNESS_QUIET";

    pub const E2E_HARNESS_LOG_LEVEL: &str = "E2E_HARNESS_LOG_LEVEL";
    pub const LOG_LEVEL_ALIASES: &[&str] = &["E2E_LOG_LEVEL"];

    pub const E2E_HARNESS_LOG_JSON: &str = "E2E_HARNESS_LOG_JSON";

    pub const E2E_HARNESS_AUDIT_LOG: &str = "E2E_HARNESS_AUDIT_LOG";
}

/// Variables the harness writes into the isolated process environment.
pub mod child {
    pub const PIP_CONFIG_FILE: &str = "PIP_CONFIG_FILE";
    pub const VIRTUAL_ENV: &str = "VIRTUAL_ENV";
    pub const PYTHONHOME: &str = "PYTHONHOME";
    pub const E2E_SCRATCH_DIR: &str = "E2E_SCRATCH_DIR";
    pub const E2E_TARGET_BIN: &str = "E2E_TARGET_BIN";
}
