//! Command handlers behind the CLI.

pub mod exec;
pub mod provision;
pub mod prune;
pub mod smoke;

use std::sync::Arc;

use e2e_harness_core::config::HarnessConfig;
use e2e_harness_core::{platform, AmbientEnv};
use e2e_harness_env::SystemCommandRunner;

use crate::suite::Suite;

/// A suite that spawns real processes on the host platform.
pub(crate) fn system_suite(config: HarnessConfig, ambient: AmbientEnv) -> Suite {
    Suite::new(config, platform::host(), Arc::new(SystemCommandRunner), ambient)
}
