//! e2e-harness: provision an isolated environment, install the CLI under
//! test into it, and run scenarios with per-scenario isolation.
//!
//! [`Suite`] is the programmatic entry point; [`run_cli`] backs the binary.

pub mod cli;
pub mod commands;
pub mod suite;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use e2e_harness_core::config::{HarnessConfig, ObservabilityConfig};
use e2e_harness_core::{observability, AmbientEnv};

pub use suite::{Scenario, Suite, CONTAINER_TAG};

/// Parse args, set up logging and dispatch. Returns the process exit code.
pub fn run_cli() -> Result<i32> {
    let cli = Cli::parse();
    let ambient = AmbientEnv::capture();
    observability::init_tracing(&ObservabilityConfig::from_env(&ambient));
    let config = cli.apply(HarnessConfig::from_env(&ambient));
    tracing::debug!(?config, "Resolved configuration");

    match cli.command {
        Commands::Provision { json } => commands::provision::cmd_provision(config, ambient, json)?,
        Commands::Smoke => commands::smoke::cmd_smoke(config, ambient)?,
        Commands::Exec { name, tags, command } => {
            return commands::exec::cmd_exec(config, ambient, name, tags, command);
        }
        Commands::Prune => commands::prune::cmd_prune(&config, &ambient),
    }
    Ok(0)
}
