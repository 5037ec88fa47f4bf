//! `e2e-harness smoke`: install, invoke the target once from a scratch dir, tear down.

use anyhow::Result;

use e2e_harness_core::config::HarnessConfig;
use e2e_harness_core::AmbientEnv;

use crate::suite::Scenario;

pub fn cmd_smoke(config: HarnessConfig, ambient: AmbientEnv) -> Result<()> {
    let mut suite = super::system_suite(config, ambient);
    let invoker = suite.invoker().clone();

    suite.run(&[Scenario::new("smoke")], |_, ctx| {
        let argv = vec![ctx.target_binary(), "--version".to_string()];
        let result = invoker.call("smoke", &argv, &ctx.process_env, ctx.scratch_dir.as_deref())?;
        println!("{}", result.stdout.trim());
        Ok(())
    })?;
    eprintln!("Smoke test passed; environment removed");
    Ok(())
}
