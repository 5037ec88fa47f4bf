//! Error taxonomy for the isolation machinery.
//!
//! Command failures and cleanup failures are fatal and surface here.
//! Best-effort steps never produce these; they log and move on.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = HarnessError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Empty command")]
    EmptyCommand,

    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error(
        "{phase} failed: command exited with code {exit_code}\n> {command}\n\
         --- stdout ---\n{stdout}\n--- stderr ---\n{stderr}"
    )]
    CommandFailed {
        phase: String,
        command: String,
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("Provisioning failed: {0}")]
    Provision(String),

    #[error("Failed to remove {}: {source}", path.display())]
    Cleanup {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl HarnessError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Exit code of a failed command, if this error is one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::CommandFailed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }
}
