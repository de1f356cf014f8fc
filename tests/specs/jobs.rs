// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job lifecycle specs: dual persistence and audit ordering.

use ob_core::{FakeClock, JobStatus, Payload, ValidateReq};
use ob_engine::{Metrics, Orchestrator};
use ob_storage::{AuditLog, RunRegistry};
use std::time::Duration;

struct World {
    orchestrator: Orchestrator<FakeClock>,
    registry: RunRegistry,
    audit: AuditLog,
    clock: FakeClock,
    _dir: tempfile::TempDir,
}

fn world() -> World {
    let dir = tempfile::tempdir().unwrap();
    let run_logs = dir.path().join("runs");
    std::fs::create_dir_all(&run_logs).unwrap();
    let registry = RunRegistry::new(dir.path().join("backups.sqlite"));
    registry.ensure_schema().unwrap();
    let audit = AuditLog::new(dir.path().join("audit.log"));
    let metrics = Metrics::new().unwrap();
    let clock = FakeClock::new();
    let orchestrator = Orchestrator::new(
        run_logs,
        registry.clone(),
        audit.clone(),
        metrics.jobs_running.clone(),
        clock.clone(),
    );
    World {
        orchestrator,
        registry,
        audit,
        clock,
        _dir: dir,
    }
}

async fn wait_terminal(world: &World, job_id: &str) -> ob_core::JobRecord {
    for _ in 0..300 {
        if let Some(record) = world.orchestrator.get(job_id) {
            if record.status.is_terminal() {
                return record;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {job_id} never finished");
}

#[tokio::test(flavor = "multi_thread")]
async fn every_terminal_job_is_durable_with_audit_in_order() {
    let w = world();

    let ok = w
        .orchestrator
        .start(
            Payload::Validate(ValidateReq::default()),
            "ops-dashboard",
            |_| Ok(serde_json::json!({"ok": true})),
        )
        .unwrap();
    let bad = w
        .orchestrator
        .start(Payload::Prune, "ops-dashboard", |_| {
            Err(ob_engine::PipelineError::NoRuns)
        })
        .unwrap();

    let ok = wait_terminal(&w, ok.job_id.as_str()).await;
    let bad = wait_terminal(&w, bad.job_id.as_str()).await;
    assert_eq!(ok.status, JobStatus::Success);
    assert_eq!(bad.status, JobStatus::Failed);

    // Durable registry holds both terminal statuses.
    assert_eq!(
        w.registry.get(ok.job_id.as_str()).unwrap().unwrap().status,
        "success"
    );
    assert_eq!(
        w.registry.get(bad.job_id.as_str()).unwrap().unwrap().status,
        "failed"
    );

    // Per job, the audit log shows queued before the terminal entry.
    for (record, terminal) in [(&ok, "success"), (&bad, "failed")] {
        let statuses: Vec<String> = w
            .audit
            .entries()
            .unwrap()
            .into_iter()
            .filter(|e| e.details["job_id"] == record.job_id.as_str())
            .map(|e| e.status)
            .collect();
        assert_eq!(statuses, vec!["queued", terminal]);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn same_second_scheduling_yields_distinct_ids() {
    let w = world();
    let mut ids = std::collections::HashSet::new();
    for _ in 0..8 {
        let record = w
            .orchestrator
            .start(Payload::Prune, "ops-dashboard", |_| {
                Ok(serde_json::Value::Null)
            })
            .unwrap();
        assert_eq!(record.job_id.timestamp_prefix(), "20260115120000");
        assert!(ids.insert(record.job_id.as_str().to_string()));
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn updated_at_moves_with_the_clock() {
    let w = world();
    let clock = w.clock.clone();
    let record = w
        .orchestrator
        .start(Payload::Prune, "ops-dashboard", move |_| {
            clock.advance_secs(42);
            Ok(serde_json::Value::Null)
        })
        .unwrap();

    let done = wait_terminal(&w, record.job_id.as_str()).await;
    assert_eq!((done.updated_at - done.created_at).num_seconds(), 42);
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_pipeline_error_string_is_preserved_everywhere() {
    let w = world();
    let record = w
        .orchestrator
        .start(Payload::Prune, "ops-dashboard", |_| {
            Err(ob_engine::PipelineError::UnknownRemote("nowhere".into()))
        })
        .unwrap();

    let done = wait_terminal(&w, record.job_id.as_str()).await;
    let error = done.error.clone().unwrap();
    assert_eq!(error, "unknown remote: nowhere");

    let log = std::fs::read_to_string(&done.log_path).unwrap();
    assert!(log.contains("ERROR: unknown remote: nowhere"));

    let audited: Vec<_> = w
        .audit
        .entries()
        .unwrap()
        .into_iter()
        .filter(|e| e.status == "failed" && e.details["job_id"] == done.job_id.as_str())
        .collect();
    assert_eq!(audited.len(), 1);
    assert_eq!(audited[0].details["details"]["error"], error);
}
