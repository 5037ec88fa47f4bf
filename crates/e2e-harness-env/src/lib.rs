//! Isolated environment machinery for end-to-end suites of a CLI tool.
//!
//! - **path_sanitizer**: drops other environment managers from PATH
//! - **context**: the active environment record ([`EnvironmentContext`])
//! - **runner**: command invocation and fatal / best-effort policies
//! - **env**: venv provisioning and installation of the tool under test
//! - **scratch**: per-scenario scratch dirs, permission-safe tree removal
//! - **docker**: best-effort container cleanup

pub mod context;
pub mod docker;
pub mod env;
pub mod error;
pub mod path_sanitizer;
pub mod runner;
pub mod scratch;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use context::{EnvironmentContext, Ownership};
pub use docker::DockerLifecycle;
pub use env::{InstallPlan, InstallationPipeline, VenvProvisioner};
pub use error::{HarnessError, Result};
pub use path_sanitizer::PathSanitizer;
pub use runner::{CommandInvoker, CommandResult, CommandRunner, FailurePolicy, SystemCommandRunner};
pub use scratch::{remove_tree, ScenarioIsolation};
