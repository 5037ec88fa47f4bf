use clap::{Parser, Subcommand};
use std::path::PathBuf;

use e2e_harness_core::config::HarnessConfig;

/// e2e-harness - isolated environment lifecycle for end-to-end CLI suites
#[derive(Parser, Debug)]
#[command(name = "e2e-harness")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Reuse this environment root instead of creating one; it is never deleted (E2E_VENV)
    #[arg(long, global = true, value_name = "DIR")]
    pub venv: Option<PathBuf>,

    /// Print every command line and its output, not only failures
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Project to install, and working directory for install commands
    #[arg(long, global = true, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Executable name of the tool under test (default: project dir name)
    #[arg(long, global = true, value_name = "NAME")]
    pub target_bin: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Flags win over environment configuration.
    pub fn apply(&self, mut config: HarnessConfig) -> HarnessConfig {
        if let Some(dir) = &self.project_dir {
            config = config.with_project_dir(dir.clone());
        }
        if let Some(venv) = &self.venv {
            config.venv_override = Some(venv.clone());
        }
        if let Some(bin) = &self.target_bin {
            config.target_binary = bin.clone();
        }
        if self.verbose {
            config.verbose = true;
        }
        config
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Provision and install, then keep the environment for reuse via E2E_VENV
    Provision {
        /// Print the environment as JSON
        #[arg(long)]
        json: bool,
    },

    /// Full lifecycle with one scenario that runs `<target> --version`
    Smoke,

    /// Full lifecycle with one scenario that runs the given command in its scratch dir
    Exec {
        /// Scenario name used in logs
        #[arg(long, default_value = "exec")]
        name: String,

        /// Scenario tag (repeatable); `docker` enables container cleanup
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,

        /// Command to run, after `--`
        #[arg(last = true, required = true, value_name = "CMD")]
        command: Vec<String>,
    },

    /// Prune unused container resources (best effort)
    Prune,
}
