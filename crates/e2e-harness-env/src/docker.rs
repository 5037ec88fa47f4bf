//! Best-effort container cleanup around container-tagged scenarios.
//!
//! Nothing here fails: a missing engine, a daemon that is down, or no
//! matching containers are all logged and ignored.

use e2e_harness_core::EnvMap;

use crate::runner::CommandInvoker;

#[derive(Debug, Clone)]
pub struct DockerLifecycle {
    invoker: CommandInvoker,
    engine: String,
    env: EnvMap,
}

impl DockerLifecycle {
    /// `engine` is the CLI binary (`docker`, `podman`, ...); `env` is the
    /// environment its commands run with.
    pub fn new(invoker: CommandInvoker, engine: impl Into<String>, env: EnvMap) -> Self {
        Self {
            invoker,
            engine: engine.into(),
            env,
        }
    }

    /// Force-remove every container whose name matches `project`, then prune.
    pub fn cleanup(&self, project: &str) {
        if project.is_empty() {
            // An empty name filter matches every container on the host.
            tracing::warn!("No project name configured, skipping container removal");
        } else {
            let ids = self.matching_containers(project);
            if ids.is_empty() {
                tracing::debug!(project = %project, "No containers to remove");
            } else {
                tracing::info!(project = %project, count = ids.len(), "Removing containers");
                let mut argv = self.argv(&["rm", "--force"]);
                argv.extend(ids);
                self.invoker.try_call("container removal", &argv, &self.env, None);
            }
        }
        self.prune();
    }

    /// Remove stopped containers, unused networks and dangling images.
    pub fn prune(&self) {
        let argv = self.argv(&["system", "prune", "--force"]);
        if self.invoker.try_call("container prune", &argv, &self.env, None).is_some() {
            tracing::debug!("Pruned container resources");
        }
    }

    fn matching_containers(&self, project: &str) -> Vec<String> {
        let filter = format!("name={project}");
        let argv = self.argv(&["ps", "-aq", "--filter", &filter]);
        self.invoker
            .try_call("container listing", &argv, &self.env, None)
            .map(|r| {
                r.stdout
                    .split_whitespace()
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn argv(&self, args: &[&str]) -> Vec<String> {
        std::iter::once(self.engine.clone())
            .chain(args.iter().map(|s| s.to_string()))
            .collect()
    }
}
