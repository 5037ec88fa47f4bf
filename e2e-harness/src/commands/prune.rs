//! `e2e-harness prune`

use e2e_harness_core::config::HarnessConfig;
use e2e_harness_core::AmbientEnv;
use e2e_harness_env::{CommandInvoker, DockerLifecycle};

/// Never fails; a missing engine is only logged.
pub fn cmd_prune(config: &HarnessConfig, ambient: &AmbientEnv) {
    DockerLifecycle::new(
        CommandInvoker::system(config.verbose),
        config.container_runtime.clone(),
        ambient.to_env_map(),
    )
    .prune();
}
