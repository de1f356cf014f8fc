// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ob_core::{Action, BackupReq, FakeClock, ValidateReq};
use std::time::Duration;

struct Fixture {
    orchestrator: Orchestrator<FakeClock>,
    registry: RunRegistry,
    audit: AuditLog,
    metrics: crate::Metrics,
    _dir: tempfile::TempDir,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let run_logs = dir.path().join("runs");
    std::fs::create_dir_all(&run_logs).unwrap();
    let registry = RunRegistry::new(dir.path().join("backups.sqlite"));
    registry.ensure_schema().unwrap();
    let audit = AuditLog::new(dir.path().join("audit.log"));
    let metrics = crate::Metrics::new().unwrap();
    let orchestrator = Orchestrator::new(
        run_logs,
        registry.clone(),
        audit.clone(),
        metrics.jobs_running.clone(),
        FakeClock::new(),
    );
    Fixture {
        orchestrator,
        registry,
        audit,
        metrics,
        _dir: dir,
    }
}

async fn wait_terminal(orchestrator: &Orchestrator<FakeClock>, job_id: &str) -> JobRecord {
    for _ in 0..200 {
        if let Some(record) = orchestrator.get(job_id) {
            if record.status.is_terminal() {
                return record;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {job_id} never reached a terminal status");
}

#[tokio::test(flavor = "multi_thread")]
async fn successful_job_reaches_success_with_result() {
    let fx = fixture();
    let record = fx
        .orchestrator
        .start(
            Payload::Validate(ValidateReq::default()),
            "ops-dashboard",
            |_ctx| Ok(serde_json::json!({"ok": true})),
        )
        .unwrap();
    assert_eq!(record.status, JobStatus::Queued);
    assert_eq!(record.action, Action::Validate);

    let done = wait_terminal(&fx.orchestrator, record.job_id.as_str()).await;
    assert_eq!(done.status, JobStatus::Success);
    assert_eq!(done.result.unwrap()["ok"], true);
    assert!(done.error.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_job_records_error_and_run_log_line() {
    let fx = fixture();
    let record = fx
        .orchestrator
        .start(Payload::Prune, "ops-dashboard", |_ctx| {
            Err(PipelineError::RunNotFound("20990101000000-ffffffff".into()))
        })
        .unwrap();

    let done = wait_terminal(&fx.orchestrator, record.job_id.as_str()).await;
    assert_eq!(done.status, JobStatus::Failed);
    let error = done.error.unwrap();
    assert!(error.contains("run not found"), "error: {error}");

    let log = std::fs::read_to_string(&done.log_path).unwrap();
    assert!(log.contains(&format!("ERROR: {error}")), "log: {log}");
}

#[tokio::test(flavor = "multi_thread")]
async fn terminal_status_is_durable() {
    let fx = fixture();
    let record = fx
        .orchestrator
        .start(
            Payload::Backup(BackupReq::default()),
            "ops-dashboard",
            |_ctx| Ok(serde_json::json!({"run_id": "x"})),
        )
        .unwrap();

    wait_terminal(&fx.orchestrator, record.job_id.as_str()).await;

    let row = fx.registry.get(record.job_id.as_str()).unwrap().unwrap();
    assert_eq!(row.status, "success");
    assert_eq!(row.action, "backup");
    assert_eq!(row.payload["action"], "backup");
}

#[tokio::test(flavor = "multi_thread")]
async fn audit_lines_mirror_transition_order() {
    let fx = fixture();
    let record = fx
        .orchestrator
        .start(
            Payload::Validate(ValidateReq::default()),
            "ops-dashboard",
            |_ctx| Ok(serde_json::Value::Null),
        )
        .unwrap();
    wait_terminal(&fx.orchestrator, record.job_id.as_str()).await;

    let entries: Vec<_> = fx
        .audit
        .entries()
        .unwrap()
        .into_iter()
        .filter(|e| e.details["job_id"] == record.job_id.as_str())
        .collect();
    let statuses: Vec<&str> = entries.iter().map(|e| e.status.as_str()).collect();
    assert_eq!(statuses, vec!["queued", "success"]);
    assert!(entries.iter().all(|e| e.actor == "ops-dashboard"));
}

#[tokio::test(flavor = "multi_thread")]
async fn gauge_returns_to_zero_after_jobs_finish() {
    let fx = fixture();
    let a = fx
        .orchestrator
        .start(Payload::Prune, "ops-dashboard", |_ctx| {
            std::thread::sleep(Duration::from_millis(50));
            Ok(serde_json::Value::Null)
        })
        .unwrap();
    let b = fx
        .orchestrator
        .start(Payload::Prune, "ops-dashboard", |_ctx| {
            Err(PipelineError::NoRuns)
        })
        .unwrap();

    wait_terminal(&fx.orchestrator, a.job_id.as_str()).await;
    wait_terminal(&fx.orchestrator, b.job_id.as_str()).await;
    assert_eq!(fx.metrics.jobs_running.get(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn jobs_in_the_same_second_get_distinct_ids() {
    let fx = fixture();
    // FakeClock stands still, so every id shares the timestamp prefix.
    let a = fx
        .orchestrator
        .start(Payload::Prune, "ops-dashboard", |_ctx| {
            Ok(serde_json::Value::Null)
        })
        .unwrap();
    let b = fx
        .orchestrator
        .start(Payload::Prune, "ops-dashboard", |_ctx| {
            Ok(serde_json::Value::Null)
        })
        .unwrap();
    assert_eq!(
        a.job_id.timestamp_prefix(),
        b.job_id.timestamp_prefix()
    );
    assert_ne!(a.job_id, b.job_id);
}

#[tokio::test(flavor = "multi_thread")]
async fn pipeline_sees_its_job_id_and_log_path() {
    let fx = fixture();
    let (tx, rx) = std::sync::mpsc::channel();
    let record = fx
        .orchestrator
        .start(Payload::Prune, "ops-dashboard", move |ctx| {
            tx.send((ctx.job_id, ctx.log_path.clone())).ok();
            Ok(serde_json::Value::Null)
        })
        .unwrap();
    wait_terminal(&fx.orchestrator, record.job_id.as_str()).await;

    let (job_id, log_path) = rx.recv().unwrap();
    assert_eq!(job_id, record.job_id);
    assert_eq!(log_path, record.log_path);
}
