//! Observability: tracing init and the JSONL audit log.
//!
//! Uses config::ObservabilityConfig for ENVSETUP_QUIET, LOG_LEVEL, LOG_JSON, AUDIT_LOG.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::Utc;
use serde_json::json;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::config::ObservabilityConfig;

/// Initialize tracing. Call once at process startup.
///
/// Logs go to stderr so the tools' stdout stays untouched. When
/// ENVSETUP_QUIET=1 only WARN and above are logged; `RUST_LOG` overrides
/// ENVSETUP_LOG_LEVEL.
pub fn init_tracing() {
    let cfg = ObservabilityConfig::from_env();
    let level = if cfg.quiet {
        "envsetup=warn".to_string()
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
                    .with_target(true),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .try_init()
    };
}

fn audit_path() -> Option<&'static str> {
    let path = ObservabilityConfig::from_env().audit_log.as_deref()?;
    if let Some(parent) = Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    Some(path)
}

/// Append one JSON record as a line. Write failures are ignored: the audit
/// log never changes the outcome of a run.
pub fn append_jsonl(path: &Path, record: &serde_json::Value) {
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) {
        if let Ok(line) = serde_json::to_string(record) {
            let _ = writeln!(f, "{}", line);
        }
    }
}

fn audit(record: serde_json::Value) {
    if let Some(path) = audit_path() {
        append_jsonl(Path::new(path), &record);
    }
}

/// Audit: setup_started
pub fn audit_setup_started(env_dir: &str, manifest: &str, python: &str) {
    audit(json!({
        "ts": Utc::now().to_rfc3339(),
        "event": "setup_started",
        "env_dir": env_dir,
        "manifest": manifest,
        "python": python,
    }));
}

/// Audit: step_finished. `exit_code` is 0 on success.
pub fn audit_step_finished(step: &str, index: usize, exit_code: i32, duration_ms: u64) {
    audit(json!({
        "ts": Utc::now().to_rfc3339(),
        "event": "step_finished",
        "step": step,
        "index": index,
        "success": exit_code == 0,
        "exit_code": exit_code,
        "duration_ms": duration_ms,
    }));
}

/// Audit: setup_finished
pub fn audit_setup_finished(exit_code: i32, duration_ms: u64) {
    audit(json!({
        "ts": Utc::now().to_rfc3339(),
        "event": "setup_finished",
        "success": exit_code == 0,
        "exit_code": exit_code,
        "duration_ms": duration_ms,
    }));
}
