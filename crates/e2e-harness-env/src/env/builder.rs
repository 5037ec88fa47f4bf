//! Build the isolated venv and derive an [`EnvironmentContext`] from it.

use std::fs;
use std::path::{Path, PathBuf};

use e2e_harness_core::{AmbientEnv, Platform};

use crate::context::{EnvironmentContext, Ownership};
use crate::error::{HarnessError, Result};
use crate::path_sanitizer::PathSanitizer;
use crate::runner::CommandInvoker;
use crate::scratch::remove_tree;

const VENV_PREFIX: &str = "e2e-venv-";

/// Per-run installer configuration, always empty.
pub const INSTALLER_CONFIG: &str = "pip.conf";

/// Creates (or reuses) the isolated environment and removes it again.
#[derive(Debug, Clone)]
pub struct VenvProvisioner {
    platform: &'static dyn Platform,
    invoker: CommandInvoker,
    sanitizer: PathSanitizer,
    base_python: Option<PathBuf>,
}

impl VenvProvisioner {
    pub fn new(platform: &'static dyn Platform, invoker: CommandInvoker) -> Self {
        Self {
            platform,
            invoker,
            sanitizer: PathSanitizer::default(),
            base_python: None,
        }
    }

    /// Interpreter used for `-m venv`. Looked up on the ambient PATH when unset.
    pub fn with_base_python(mut self, python: Option<PathBuf>) -> Self {
        self.base_python = python;
        self
    }

    pub fn with_sanitizer(mut self, sanitizer: PathSanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    /// Reuse `venv_override` (never deleted) or create a fresh owned venv.
    ///
    /// A fresh root that fails to build is removed before the error is
    /// returned, so a failed provision leaves nothing behind.
    pub fn provision(
        &self,
        venv_override: Option<&Path>,
        ambient: &AmbientEnv,
        target_binary: &str,
    ) -> Result<EnvironmentContext> {
        if target_binary.trim().is_empty() {
            return Err(HarnessError::Provision(
                "no target binary name; set E2E_TARGET_BIN or --target-bin".to_string(),
            ));
        }
        let (root, ownership) = match venv_override {
            Some(root) => (reuse_root(root)?, Ownership::External),
            None => (fresh_root()?, Ownership::Owned),
        };

        match self.build(&root, ambient, target_binary, ownership) {
            Ok(ctx) => {
                tracing::info!(
                    root = %ctx.isolated_root.display(),
                    ownership = ?ctx.ownership,
                    "Isolated environment ready"
                );
                Ok(ctx)
            }
            Err(e) => {
                if ownership == Ownership::Owned && root.exists() {
                    if let Err(cleanup) = remove_tree(self.platform, &root) {
                        tracing::warn!("Could not remove half-built environment: {}", cleanup);
                    }
                }
                Err(e)
            }
        }
    }

    /// Delete the environment root if this run created it.
    pub fn teardown(&self, ctx: &EnvironmentContext) -> Result<()> {
        if !ctx.is_owned() {
            tracing::info!(root = %ctx.isolated_root.display(), "Keeping external environment");
            return Ok(());
        }
        if !ctx.isolated_root.exists() {
            return Ok(());
        }
        remove_tree(self.platform, &ctx.isolated_root)?;
        tracing::info!(root = %ctx.isolated_root.display(), "Removed isolated environment");
        Ok(())
    }

    fn build(
        &self,
        root: &Path,
        ambient: &AmbientEnv,
        target_binary: &str,
        ownership: Ownership,
    ) -> Result<EnvironmentContext> {
        if ownership == Ownership::Owned {
            self.create_venv(root, ambient)?;
        }

        let installer_config = root.join(INSTALLER_CONFIG);
        // File::create truncates an existing config from a previous run.
        fs::File::create(&installer_config)
            .map_err(|e| HarnessError::io(format!("Write {}", installer_config.display()), e))?;

        let ctx = EnvironmentContext::new(
            self.platform,
            &self.sanitizer,
            ambient,
            root,
            target_binary,
            &installer_config,
            ownership,
        );
        if !ctx.interpreter_path.is_file() {
            return Err(HarnessError::Provision(format!(
                "no interpreter at {}",
                ctx.interpreter_path.display()
            )));
        }
        Ok(ctx)
    }

    fn create_venv(&self, root: &Path, ambient: &AmbientEnv) -> Result<()> {
        let python = self.resolve_python(ambient)?;
        let argv = vec![
            python.to_string_lossy().to_string(),
            "-m".to_string(),
            "venv".to_string(),
            root.to_string_lossy().to_string(),
        ];
        self.invoker
            .call("venv creation", &argv, &ambient.to_env_map(), None)?;
        Ok(())
    }

    fn resolve_python(&self, ambient: &AmbientEnv) -> Result<PathBuf> {
        if let Some(python) = &self.base_python {
            return Ok(python.clone());
        }
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let search = ambient.path_value(self.platform);
        ["python3", "python"]
            .iter()
            .find_map(|name| which::which_in(name, search, &cwd).ok())
            .ok_or_else(|| {
                HarnessError::Provision("python3 or python not found in PATH".to_string())
            })
    }
}

fn reuse_root(root: &Path) -> Result<PathBuf> {
    if !root.is_dir() {
        return Err(HarnessError::Provision(format!(
            "E2E_VENV points at {}, which is not a directory",
            root.display()
        )));
    }
    Ok(root.to_path_buf())
}

fn fresh_root() -> Result<PathBuf> {
    let dir = tempfile::Builder::new()
        .prefix(VENV_PREFIX)
        .tempdir()
        .map_err(|e| HarnessError::io("Create venv dir", e))?;
    Ok(dir.keep())
}
