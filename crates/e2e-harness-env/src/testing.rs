//! Recording fake for [`CommandRunner`], shared by this crate's tests and the
//! suite tests (`test-util` feature).

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use e2e_harness_core::EnvMap;

use crate::error::Result;
use crate::runner::{CommandResult, CommandRunner};

type Handler = dyn Fn(&[String], &EnvMap, Option<&Path>) -> Result<CommandResult> + Send + Sync;

/// One command as the fake saw it.
#[derive(Debug, Clone)]
pub struct RecordedCommand {
    pub argv: Vec<String>,
    pub env: EnvMap,
    pub cwd: Option<PathBuf>,
}

impl RecordedCommand {
    pub fn line(&self) -> String {
        self.argv.join(" ")
    }
}

pub struct FakeRunner {
    calls: Mutex<Vec<RecordedCommand>>,
    handler: Box<Handler>,
}

impl Default for FakeRunner {
    fn default() -> Self {
        Self::new(|_, _, _| Ok(ok("")))
    }
}

impl FakeRunner {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&[String], &EnvMap, Option<&Path>) -> Result<CommandResult> + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            handler: Box::new(handler),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCommand> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.calls().iter().map(RecordedCommand::line).collect()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, argv: &[String], env: &EnvMap, cwd: Option<&Path>) -> Result<CommandResult> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCommand {
                argv: argv.to_vec(),
                env: env.clone(),
                cwd: cwd.map(Path::to_path_buf),
            });
        }
        (self.handler)(argv, env, cwd)
    }
}

pub fn ok(stdout: &str) -> CommandResult {
    CommandResult {
        exit_code: 0,
        stdout: stdout.to_string(),
        stderr: String::new(),
    }
}

pub fn exit(code: i32, stderr: &str) -> CommandResult {
    CommandResult {
        exit_code: code,
        stdout: String::new(),
        stderr: stderr.to_string(),
    }
}

/// Emulates `python -m venv <root>`: lays out an interpreter, installer and
/// the named tool under the platform's bin directory.
pub fn fake_venv(
    platform: &dyn e2e_harness_core::Platform,
    root: &Path,
    tools: &[&str],
) -> std::io::Result<()> {
    let bin = platform.bin_dir(root);
    std::fs::create_dir_all(&bin)?;
    std::fs::write(root.join("pyvenv.cfg"), "home = /usr/bin\n")?;
    for name in ["python", "pip"].iter().chain(tools) {
        std::fs::write(platform.executable(root, name), "")?;
    }
    Ok(())
}
