//! Observability: tracing init and the command audit log.
//!
//! Uses config::ObservabilityConfig for E2E_HARNESS_QUIET, LOG_LEVEL, LOG_JSON, AUDIT_LOG.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use serde_json::json;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::config::ObservabilityConfig;

static AUDIT_PATH: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Initialize tracing. Call once at process startup; later calls are no-ops.
/// When E2E_HARNESS_QUIET=1 only WARN and above are logged.
pub fn init_tracing(cfg: &ObservabilityConfig) {
    let level = if cfg.quiet {
        "warn".to_string()
    } else {
        cfg.log_level.clone()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    };

    set_audit_log(cfg.audit_log.as_deref().map(Path::new));
}

/// Route audit records to `path`, or disable the audit log with `None`.
pub fn set_audit_log(path: Option<&Path>) {
    if let Some(parent) = path.and_then(Path::parent) {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Ok(mut guard) = AUDIT_PATH.lock() {
        *guard = path.map(Path::to_path_buf);
    }
}

fn audit_path() -> Option<PathBuf> {
    AUDIT_PATH.lock().ok()?.clone()
}

fn append_jsonl(path: &Path, record: &serde_json::Value) {
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) {
        if let Ok(line) = serde_json::to_string(record) {
            let _ = writeln!(f, "{}", line);
        }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Audit: command_started (right before spawn)
pub fn audit_command_started(argv: &[String], cwd: Option<&Path>) {
    if let Some(path) = audit_path() {
        let record = json!({
            "ts": now(),
            "event": "command_started",
            "argv": argv,
            "cwd": cwd.map(|p| p.display().to_string()),
        });
        append_jsonl(&path, &record);
    }
}

/// Audit: command_completed
pub fn audit_command_completed(
    argv: &[String],
    exit_code: i32,
    duration_ms: u64,
    stdout_len: usize,
) {
    if let Some(path) = audit_path() {
        let record = json!({
            "ts": now(),
            "event": "command_completed",
            "program": argv.first(),
            "exit_code": exit_code,
            "duration_ms": duration_ms,
            "stdout_len": stdout_len,
            "success": exit_code == 0,
        });
        append_jsonl(&path, &record);
    }
}

/// Audit: command_completed for a command that never ran to an exit code
/// (e.g. the program could not be spawned).
pub fn audit_command_failed(argv: &[String], error: &str, duration_ms: u64) {
    if let Some(path) = audit_path() {
        let record = json!({
            "ts": now(),
            "event": "command_completed",
            "program": argv.first(),
            "exit_code": null,
            "duration_ms": duration_ms,
            "error": error,
            "success": false,
        });
        append_jsonl(&path, &record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_records_are_jsonl() {
        let tmp = tempfile::tempdir().unwrap();
        let log = tmp.path().join("logs").join("audit.jsonl");
        set_audit_log(Some(&log));

        let argv = vec!["python".to_string(), "--version".to_string()];
        audit_command_started(&argv, Some(tmp.path()));
        audit_command_completed(&argv, 0, 12, 14);
        audit_command_failed(&argv, "No such file or directory", 1);
        set_audit_log(None);

        let content = std::fs::read_to_string(&log).unwrap();
        let records: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["event"], "command_started");
        assert_eq!(records[0]["argv"][1], "--version");
        assert_eq!(records[1]["event"], "command_completed");
        assert_eq!(records[1]["success"], true);
        assert_eq!(records[2]["event"], "command_completed");
        assert_eq!(records[2]["success"], false);
        assert!(records[2]["exit_code"].is_null());
        assert_eq!(records[2]["error"], "No such file or directory");
    }
}
