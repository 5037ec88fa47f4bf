//! Install the tool under test into the isolated environment.

use std::path::PathBuf;

use e2e_harness_core::config::HarnessConfig;

use crate::context::EnvironmentContext;
use crate::error::Result;
use crate::runner::CommandInvoker;

/// What gets installed, and from where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    pub build_requirements: Vec<String>,
    pub package_spec: String,
    /// Interpreter arguments for plugin registration; `None` skips the step.
    pub plugin_install: Option<Vec<String>>,
    pub working_dir: PathBuf,
}

impl InstallPlan {
    pub fn from_config(cfg: &HarnessConfig) -> Self {
        Self {
            build_requirements: cfg.build_requirements.clone(),
            package_spec: cfg.package_spec.clone(),
            plugin_install: cfg.plugin_install.clone(),
            working_dir: cfg.project_dir.clone(),
        }
    }

    /// `<python> -m pip install -U <requirements...> <package>`
    pub fn upgrade_argv(&self, ctx: &EnvironmentContext) -> Vec<String> {
        let mut argv = vec![
            ctx.interpreter(),
            "-m".to_string(),
            "pip".to_string(),
            "install".to_string(),
            "-U".to_string(),
        ];
        argv.extend(self.build_requirements.iter().cloned());
        argv.push(self.package_spec.clone());
        argv
    }

    /// `<python> <plugin_install...>`
    pub fn plugin_argv(&self, ctx: &EnvironmentContext) -> Option<Vec<String>> {
        let args = self.plugin_install.as_ref()?;
        let mut argv = vec![ctx.interpreter()];
        argv.extend(args.iter().cloned());
        Some(argv)
    }
}

/// Runs the install commands. Either failing aborts setup.
#[derive(Debug, Clone)]
pub struct InstallationPipeline {
    invoker: CommandInvoker,
    plan: InstallPlan,
}

impl InstallationPipeline {
    pub fn new(invoker: CommandInvoker, plan: InstallPlan) -> Self {
        Self { invoker, plan }
    }

    pub fn plan(&self) -> &InstallPlan {
        &self.plan
    }

    pub fn run(&self, ctx: &EnvironmentContext) -> Result<()> {
        let cwd = Some(self.plan.working_dir.as_path());

        tracing::info!(package = %self.plan.package_spec, "Installing package under test");
        self.invoker
            .call("installation", &self.plan.upgrade_argv(ctx), &ctx.process_env, cwd)?;

        if let Some(argv) = self.plan.plugin_argv(ctx) {
            tracing::info!("Registering plugins");
            self.invoker
                .call("plugin installation", &argv, &ctx.process_env, cwd)?;
        }
        Ok(())
    }

    /// Run `<target> --version` and return the first line it prints.
    pub fn verify(&self, ctx: &EnvironmentContext) -> Result<String> {
        let argv = vec![ctx.target_binary(), "--version".to_string()];
        let result = self.invoker.call("verify", &argv, &ctx.process_env, None)?;
        // Some tools print their version on stderr.
        let text = if result.stdout.trim().is_empty() {
            &result.stderr
        } else {
            &result.stdout
        };
        let version = text.lines().next().unwrap_or_default().trim().to_string();
        tracing::info!(
            binary = %ctx.target_binary_path.display(),
            version = %version,
            "Target binary verified"
        );
        Ok(version)
    }
}
