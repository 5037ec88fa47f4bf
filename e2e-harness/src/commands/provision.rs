//! `e2e-harness provision`

use anyhow::{Context, Result};
use serde_json::json;

use e2e_harness_core::config::HarnessConfig;
use e2e_harness_core::AmbientEnv;

pub fn cmd_provision(config: HarnessConfig, ambient: AmbientEnv, as_json: bool) -> Result<()> {
    let mut suite = super::system_suite(config, ambient);
    suite.before_all()?;
    let version = suite.version().unwrap_or_default().to_string();
    let config = suite.config().clone();
    let ctx = suite
        .keep_environment()
        .context("Environment missing after setup")?;

    if as_json {
        let report = json!({
            "isolated_root": ctx.isolated_root,
            "interpreter_path": ctx.interpreter_path,
            "installer_path": ctx.installer_path,
            "target_binary_path": ctx.target_binary_path,
            "ownership": ctx.ownership,
            "version": version,
            "path": ctx.path_var(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Environment: {}", ctx.isolated_root.display());
        println!("Interpreter: {}", ctx.interpreter_path.display());
        println!("Target:      {} ({})", ctx.target_binary_path.display(), version);
        println!();
        println!("Reuse it with:");
        println!("  export E2E_VENV={}", ctx.isolated_root.display());
    }
    Ok(())
}
