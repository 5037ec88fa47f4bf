//! Command invocation: run an external command with an explicit environment
//! mapping and capture its output.
//!
//! The invoker itself carries no failure policy. Callers decide what a
//! non-zero exit means by applying a [`FailurePolicy`] to the outcome.

use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Instant;

use e2e_harness_core::observability;
use e2e_harness_core::EnvMap;

use crate::error::{HarnessError, Result};

/// Captured result of one command. Consumed immediately, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// stdout followed by stderr
    pub fn combined_output(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Extension point for spawning processes.
///
/// `SystemCommandRunner` is the real implementation; tests substitute a
/// recording fake.
pub trait CommandRunner: Send + Sync {
    /// Run `argv` to completion with exactly `env` as its environment.
    /// A non-zero exit is a normal `Ok` result; only failure to start is an error.
    fn run(&self, argv: &[String], env: &EnvMap, cwd: Option<&Path>) -> Result<CommandResult>;
}

/// Spawns real processes with `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, argv: &[String], env: &EnvMap, cwd: Option<&Path>) -> Result<CommandResult> {
        let (program, args) = argv.split_first().ok_or(HarnessError::EmptyCommand)?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .env_clear()
            .envs(env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|source| HarnessError::Spawn {
            program: program.clone(),
            source,
        })?;

        Ok(CommandResult {
            // Killed by a signal: no code, report as failure.
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Runs commands through a [`CommandRunner`], optionally echoing each command
/// line and its captured output.
#[derive(Clone)]
pub struct CommandInvoker {
    runner: Arc<dyn CommandRunner>,
    verbose: bool,
}

impl std::fmt::Debug for CommandInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandInvoker")
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

impl CommandInvoker {
    pub fn new(runner: Arc<dyn CommandRunner>, verbose: bool) -> Self {
        Self { runner, verbose }
    }

    pub fn system(verbose: bool) -> Self {
        Self::new(Arc::new(SystemCommandRunner), verbose)
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Run synchronously and capture stdout/stderr in full. No retries, no timeout.
    pub fn invoke(
        &self,
        argv: &[String],
        env: &EnvMap,
        cwd: Option<&Path>,
    ) -> Result<CommandResult> {
        if argv.is_empty() {
            return Err(HarnessError::EmptyCommand);
        }
        observability::audit_command_started(argv, cwd);
        let start = Instant::now();

        let result = match self.runner.run(argv, env, cwd) {
            Ok(result) => result,
            Err(e) => {
                observability::audit_command_failed(
                    argv,
                    &e.to_string(),
                    start.elapsed().as_millis() as u64,
                );
                return Err(e);
            }
        };

        observability::audit_command_completed(
            argv,
            result.exit_code,
            start.elapsed().as_millis() as u64,
            result.stdout.len(),
        );
        if self.verbose {
            tracing::info!("> {}", display_command(argv));
            tracing::info!("{}", result.stdout);
            tracing::info!("{}", result.stderr);
        }
        Ok(result)
    }

    /// `invoke` under the fatal-unless-zero policy.
    pub fn call(
        &self,
        phase: &str,
        argv: &[String],
        env: &EnvMap,
        cwd: Option<&Path>,
    ) -> Result<CommandResult> {
        let result = self.invoke(argv, env, cwd)?;
        ensure_success(phase, argv, result)
    }

    /// `invoke` under the best-effort policy: failures are logged and dropped.
    pub fn try_call(
        &self,
        phase: &str,
        argv: &[String],
        env: &EnvMap,
        cwd: Option<&Path>,
    ) -> Option<CommandResult> {
        FailurePolicy::BestEffort
            .apply(phase, argv, self.invoke(argv, env, cwd))
            .ok()
            .flatten()
    }
}

/// Turn a non-zero exit into [`HarnessError::CommandFailed`].
pub fn ensure_success(
    phase: &str,
    argv: &[String],
    result: CommandResult,
) -> Result<CommandResult> {
    if result.success() {
        return Ok(result);
    }
    Err(HarnessError::CommandFailed {
        phase: phase.to_string(),
        command: display_command(argv),
        exit_code: result.exit_code,
        stdout: result.stdout,
        stderr: result.stderr,
    })
}

/// How a caller treats an unsuccessful command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Spawn errors and non-zero exits abort the current phase.
    Fatal,
    /// Spawn errors and non-zero exits are logged at warn and ignored.
    BestEffort,
}

impl FailurePolicy {
    /// Returns `Ok(Some(result))` for a zero exit. Under `BestEffort` every
    /// failure becomes `Ok(None)`; under `Fatal` it becomes an error.
    pub fn apply(
        self,
        phase: &str,
        argv: &[String],
        outcome: Result<CommandResult>,
    ) -> Result<Option<CommandResult>> {
        match (self, outcome) {
            (Self::Fatal, outcome) => outcome
                .and_then(|r| ensure_success(phase, argv, r))
                .map(Some),
            (Self::BestEffort, Ok(result)) if result.success() => Ok(Some(result)),
            (Self::BestEffort, Ok(result)) => {
                tracing::warn!(
                    phase = %phase,
                    exit_code = result.exit_code,
                    "Ignoring failed command: {}",
                    display_command(argv)
                );
                Ok(None)
            }
            (Self::BestEffort, Err(e)) => {
                tracing::warn!(phase = %phase, "Ignoring command error: {}", e);
                Ok(None)
            }
        }
    }
}

/// Render argv as a shell-like command line for diagnostics.
pub fn display_command(argv: &[String]) -> String {
    argv.iter()
        .map(|a| {
            if a.is_empty() {
                "''".to_string()
            } else if a.contains(' ') || a.contains('"') || a.contains('\'') {
                format!("'{}'", a.replace('\'', "'\\''"))
            } else {
                a.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests;
