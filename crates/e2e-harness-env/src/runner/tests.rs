//! Tests for command invocation and failure policies.

use super::*;
use crate::testing::{exit, ok, FakeRunner};

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

#[cfg(unix)]
fn sh_env() -> EnvMap {
    let mut env = EnvMap::new();
    env.insert("PATH".into(), "/usr/bin:/bin".into());
    env
}

#[cfg(unix)]
#[test]
fn test_system_runner_captures_output() {
    let res = SystemCommandRunner
        .run(&argv(&["sh", "-c", "echo out; echo err >&2"]), &sh_env(), None)
        .unwrap();
    assert_eq!(res.exit_code, 0);
    assert_eq!(res.stdout, "out\n");
    assert_eq!(res.stderr, "err\n");
    assert_eq!(res.combined_output(), "out\nerr\n");
}

#[cfg(unix)]
#[test]
fn test_system_runner_reports_nonzero_exit() {
    let res = SystemCommandRunner
        .run(&argv(&["sh", "-c", "exit 3"]), &sh_env(), None)
        .unwrap();
    assert_eq!(res.exit_code, 3);
    assert!(!res.success());
}

#[cfg(unix)]
#[test]
fn test_system_runner_uses_only_given_env() {
    let mut env = sh_env();
    env.insert("E2E_MARKER".into(), "visible".into());
    let res = SystemCommandRunner
        .run(&argv(&["sh", "-c", "echo \"$E2E_MARKER:${HOME:-unset}\""]), &env, None)
        .unwrap();
    assert_eq!(res.stdout.trim(), "visible:unset");
}

#[cfg(unix)]
#[test]
fn test_system_runner_honors_cwd() {
    let tmp = tempfile::tempdir().unwrap();
    let res = SystemCommandRunner
        .run(&argv(&["sh", "-c", "pwd"]), &sh_env(), Some(tmp.path()))
        .unwrap();
    let reported = std::path::PathBuf::from(res.stdout.trim());
    assert_eq!(
        reported.canonicalize().unwrap(),
        tmp.path().canonicalize().unwrap()
    );
}

#[test]
fn test_system_runner_spawn_failure() {
    let err = SystemCommandRunner
        .run(&argv(&["definitely-not-a-real-binary-e2e"]), &EnvMap::new(), None)
        .unwrap_err();
    assert!(matches!(err, HarnessError::Spawn { .. }));
}

#[test]
fn test_invoke_rejects_empty_argv() {
    let invoker = CommandInvoker::new(Arc::new(FakeRunner::default()), false);
    let err = invoker.invoke(&[], &EnvMap::new(), None).unwrap_err();
    assert!(matches!(err, HarnessError::EmptyCommand));
}

#[test]
fn test_invoke_returns_failure_without_policy() {
    let runner = Arc::new(FakeRunner::new(|_, _, _| Ok(exit(2, "boom"))));
    let invoker = CommandInvoker::new(runner.clone(), true);
    let res = invoker
        .invoke(&argv(&["tool", "--flag"]), &EnvMap::new(), None)
        .unwrap();
    assert_eq!(res.exit_code, 2);
    assert_eq!(res.stderr, "boom");
    assert_eq!(runner.lines(), vec!["tool --flag"]);
}

#[test]
fn test_call_is_fatal_on_nonzero() {
    let runner = Arc::new(FakeRunner::new(|_, _, _| {
        Ok(CommandResult {
            exit_code: 1,
            stdout: "partial".into(),
            stderr: "no such package".into(),
        })
    }));
    let invoker = CommandInvoker::new(runner, false);
    let err = invoker
        .call("installation", &argv(&["pip", "install", "x y"]), &EnvMap::new(), None)
        .unwrap_err();
    assert_eq!(err.exit_code(), Some(1));
    let msg = err.to_string();
    assert!(msg.contains("installation failed"));
    assert!(msg.contains("> pip install 'x y'"));
    assert!(msg.contains("partial"));
    assert!(msg.contains("no such package"));
}

#[test]
fn test_call_passes_success_through() {
    let runner = FakeRunner::new(|_, _, _| Ok(ok("1.2.3\n")));
    let invoker = CommandInvoker::new(Arc::new(runner), false);
    let res = invoker
        .call("verify", &argv(&["tool", "--version"]), &EnvMap::new(), None)
        .unwrap();
    assert_eq!(res.stdout, "1.2.3\n");
}

#[test]
fn test_try_call_swallows_failures() {
    let failing = CommandInvoker::new(
        Arc::new(FakeRunner::new(|_, _, _| Ok(exit(125, "")))),
        false,
    );
    assert!(failing
        .try_call("prune", &argv(&["docker", "system", "prune"]), &EnvMap::new(), None)
        .is_none());

    let missing = CommandInvoker::new(
        Arc::new(FakeRunner::new(|argv, _, _| {
            Err(HarnessError::Spawn {
                program: argv[0].clone(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        })),
        false,
    );
    assert!(missing
        .try_call("prune", &argv(&["docker"]), &EnvMap::new(), None)
        .is_none());
}

#[test]
fn test_policy_apply() {
    let args = argv(&["x"]);
    assert_eq!(
        FailurePolicy::Fatal.apply("p", &args, Ok(ok("y"))).unwrap(),
        Some(ok("y"))
    );
    assert!(FailurePolicy::Fatal.apply("p", &args, Ok(exit(1, ""))).is_err());
    assert_eq!(
        FailurePolicy::BestEffort.apply("p", &args, Ok(exit(1, ""))).unwrap(),
        None
    );
    assert_eq!(
        FailurePolicy::BestEffort
            .apply("p", &args, Err(HarnessError::EmptyCommand))
            .unwrap(),
        None
    );
}

#[test]
fn test_display_command_quotes() {
    assert_eq!(
        display_command(&argv(&["pip", "install", "pip>=20.0,<21.3", "a b", ""])),
        "pip install pip>=20.0,<21.3 'a b' ''"
    );
}

#[test]
fn test_spawn_failure_still_closes_audit_record() {
    let tmp = tempfile::tempdir().unwrap();
    let log = tmp.path().join("audit.jsonl");
    e2e_harness_core::observability::set_audit_log(Some(&log));

    let program = "spawn-fails-for-audit";
    let invoker = CommandInvoker::new(
        Arc::new(FakeRunner::new(|argv, _, _| {
            Err(HarnessError::Spawn {
                program: argv[0].clone(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        })),
        false,
    );
    let err = invoker
        .invoke(&argv(&[program, "--help"]), &EnvMap::new(), None)
        .unwrap_err();
    e2e_harness_core::observability::set_audit_log(None);
    assert!(matches!(err, HarnessError::Spawn { .. }));

    let records: Vec<serde_json::Value> = std::fs::read_to_string(&log)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .filter(|r: &serde_json::Value| r["argv"][0] == program || r["program"] == program)
        .collect();
    assert_eq!(records.len(), 2, "{records:?}");
    assert_eq!(records[0]["event"], "command_started");
    assert_eq!(records[1]["event"], "command_completed");
    assert_eq!(records[1]["success"], false);
    assert!(records[1]["exit_code"].is_null());
    assert!(records[1]["error"]
        .as_str()
        .unwrap()
        .contains("spawn-fails-for-audit"));
}
