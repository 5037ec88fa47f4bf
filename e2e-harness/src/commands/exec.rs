//! `e2e-harness exec -- <cmd...>`: run one command as a scenario.

use std::io::Write;

use anyhow::Result;

use e2e_harness_core::config::env_keys::child;
use e2e_harness_core::config::HarnessConfig;
use e2e_harness_core::AmbientEnv;
use e2e_harness_env::EnvironmentContext;

use crate::suite::Scenario;

/// Returns the command's exit code.
pub fn cmd_exec(
    config: HarnessConfig,
    ambient: AmbientEnv,
    name: String,
    tags: Vec<String>,
    command: Vec<String>,
) -> Result<i32> {
    let scenario = tags
        .into_iter()
        .fold(Scenario::new(name), |s, tag| s.with_tag(tag));
    let mut suite = super::system_suite(config, ambient);
    let invoker = suite.invoker().clone();

    let mut exit_code = 0;
    suite.run(&[scenario], |_, ctx| {
        let result = invoker.invoke(&command, &scenario_env(ctx), ctx.scratch_dir.as_deref())?;
        print!("{}", result.stdout);
        eprint!("{}", result.stderr);
        let _ = std::io::stdout().flush();
        exit_code = result.exit_code;
        Ok(())
    })?;
    Ok(exit_code)
}

/// The context's environment plus the scratch dir and target binary.
fn scenario_env(ctx: &EnvironmentContext) -> e2e_harness_core::EnvMap {
    let mut env = ctx.process_env.clone();
    if let Some(dir) = &ctx.scratch_dir {
        env.insert(child::E2E_SCRATCH_DIR.to_string(), dir.to_string_lossy().to_string());
    }
    env.insert(child::E2E_TARGET_BIN.to_string(), ctx.target_binary());
    env
}
