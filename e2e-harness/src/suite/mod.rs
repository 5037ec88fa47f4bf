//! Suite lifecycle: one isolated environment per run, one scratch dir per
//! scenario, container cleanup around tagged scenarios.
//!
//! ```text
//! before_all      provision -> install -> verify
//!   before_scenario   acquire scratch dir
//!   (scenario body)
//!   after_scenario    container cleanup (tagged) / prune, release scratch dir
//! after_all       teardown owned env, prune
//! ```
//!
//! `after_all` runs at most once and still runs when setup failed halfway.
//! Dropping a suite that was never finished runs it too.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};

use e2e_harness_core::config::HarnessConfig;
use e2e_harness_core::{AmbientEnv, Platform};
use e2e_harness_env::{
    CommandInvoker, CommandRunner, DockerLifecycle, EnvironmentContext, InstallPlan,
    InstallationPipeline, ScenarioIsolation, VenvProvisioner,
};

/// Scenarios carrying this tag get their project's containers removed afterwards.
pub const CONTAINER_TAG: &str = "docker";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub tags: BTreeSet<String>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tags: BTreeSet::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn needs_containers(&self) -> bool {
        self.tags.contains(CONTAINER_TAG)
    }
}

pub struct Suite {
    config: HarnessConfig,
    platform: &'static dyn Platform,
    ambient: AmbientEnv,
    invoker: CommandInvoker,
    provisioner: VenvProvisioner,
    pipeline: InstallationPipeline,
    docker: DockerLifecycle,
    ctx: Option<EnvironmentContext>,
    version: Option<String>,
    finished: bool,
}

impl Suite {
    pub fn new(
        config: HarnessConfig,
        platform: &'static dyn Platform,
        runner: Arc<dyn CommandRunner>,
        ambient: AmbientEnv,
    ) -> Self {
        let invoker = CommandInvoker::new(runner, config.verbose);
        let provisioner = VenvProvisioner::new(platform, invoker.clone())
            .with_base_python(config.base_python.clone());
        let pipeline =
            InstallationPipeline::new(invoker.clone(), InstallPlan::from_config(&config));
        let docker = DockerLifecycle::new(
            invoker.clone(),
            config.container_runtime.clone(),
            ambient.to_env_map(),
        );
        Self {
            config,
            platform,
            ambient,
            invoker,
            provisioner,
            pipeline,
            docker,
            ctx: None,
            version: None,
            finished: false,
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn invoker(&self) -> &CommandInvoker {
        &self.invoker
    }

    pub fn context(&self) -> Option<&EnvironmentContext> {
        self.ctx.as_ref()
    }

    pub fn context_mut(&mut self) -> Option<&mut EnvironmentContext> {
        self.ctx.as_mut()
    }

    /// Version line reported by the target binary after installation.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Provision, install and verify. The context is kept as soon as it
    /// exists so `after_all` can tear it down if installation fails.
    pub fn before_all(&mut self) -> Result<()> {
        if self.ctx.is_some() {
            return Ok(());
        }
        let mut ctx = self
            .provisioner
            .provision(
                self.config.venv_override.as_deref(),
                &self.ambient,
                &self.config.target_binary,
            )
            .context("Failed to provision isolated environment")?;
        ctx.set_project_name(self.config.project_name.clone());
        let ctx = self.ctx.insert(ctx);

        self.pipeline
            .run(ctx)
            .context("Failed to install package under test")?;
        let version = self
            .pipeline
            .verify(ctx)
            .context("Installed target binary is not invokable")?;
        self.version = Some(version);
        Ok(())
    }

    pub fn before_scenario(&mut self, scenario: &Scenario) -> Result<PathBuf> {
        let ctx = self
            .ctx
            .as_mut()
            .ok_or_else(|| anyhow!("before_scenario called before before_all"))?;
        let dir = ScenarioIsolation::new(self.platform)
            .acquire(ctx)
            .with_context(|| format!("Failed to create scratch dir for '{}'", scenario.name))?;
        tracing::debug!(scenario = %scenario.name, scratch = %dir.display(), "Scenario started");
        Ok(dir)
    }

    pub fn after_scenario(&mut self, scenario: &Scenario) -> Result<()> {
        let Some(ctx) = self.ctx.as_mut() else {
            self.docker.prune();
            return Ok(());
        };
        if scenario.needs_containers() {
            self.docker.cleanup(&ctx.project_name);
        } else {
            self.docker.prune();
        }
        ScenarioIsolation::new(self.platform)
            .release_current(ctx)
            .with_context(|| format!("Failed to remove scratch dir of '{}'", scenario.name))?;
        tracing::debug!(scenario = %scenario.name, "Scenario finished");
        Ok(())
    }

    /// Tear down the owned environment and prune. Only the first call does
    /// anything. The prune is attempted even when teardown fails.
    pub fn after_all(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        let teardown = match self.ctx.take() {
            Some(mut ctx) => {
                let scratch = ScenarioIsolation::new(self.platform).release_current(&mut ctx);
                let env = self.provisioner.teardown(&ctx);
                scratch.and(env).context("Failed to tear down isolated environment")
            }
            None => Ok(()),
        };
        self.docker.prune();
        teardown
    }

    /// Drive the whole lifecycle over `scenarios`.
    ///
    /// A failing scenario body does not stop the run; its teardown still
    /// happens and the remaining scenarios execute. Harness failures (setup,
    /// scratch removal) stop the run. `after_all` always runs. The first
    /// error is returned.
    pub fn run<F>(&mut self, scenarios: &[Scenario], mut body: F) -> Result<()>
    where
        F: FnMut(&Scenario, &mut EnvironmentContext) -> Result<()>,
    {
        let outcome = self.run_scenarios(scenarios, &mut body);
        let teardown = self.after_all();
        outcome.and(teardown)
    }

    /// Mark the run finished without tearing anything down and hand back the
    /// context, for reuse through `E2E_VENV`.
    pub fn keep_environment(mut self) -> Option<EnvironmentContext> {
        self.finished = true;
        self.ctx.take()
    }

    fn run_scenarios<F>(&mut self, scenarios: &[Scenario], body: &mut F) -> Result<()>
    where
        F: FnMut(&Scenario, &mut EnvironmentContext) -> Result<()>,
    {
        self.before_all()?;

        let mut first_failure = None;
        for scenario in scenarios {
            self.before_scenario(scenario)?;
            let result = match self.ctx.as_mut() {
                Some(ctx) => body(scenario, ctx),
                None => Err(anyhow!("environment disappeared during '{}'", scenario.name)),
            };
            self.after_scenario(scenario)?;

            match result {
                Ok(()) => tracing::info!(scenario = %scenario.name, "passed"),
                Err(e) => {
                    tracing::error!(scenario = %scenario.name, "failed: {:#}", e);
                    if first_failure.is_none() {
                        first_failure =
                            Some(e.context(format!("Scenario '{}' failed", scenario.name)));
                    }
                }
            }
        }
        first_failure.map_or(Ok(()), Err)
    }
}

impl Drop for Suite {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.after_all() {
                tracing::warn!("Teardown on drop failed: {:#}", e);
            }
        }
    }
}
