// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use ob_core::{Action, Clock, JobId, JobRecord, OpsPaths};
use ob_engine::Metrics;
use ob_storage::{AuditLog, RunRegistry};
use tower::ServiceExt;

const TOKEN: &str = "test-token-123";

struct Harness {
    state: AppState,
    _dir: tempfile::TempDir,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let paths = OpsPaths::new(dir.path().join("ops"), dir.path().join("backups"));
    paths.ensure_tree().unwrap();
    std::fs::write(paths.token_file(), format!("{TOKEN}\n")).unwrap();
    std::fs::write(
        paths.apps_file(),
        "apps:\n  blog:\n    containers: [blog-web]\n",
    )
    .unwrap();

    let metrics = Metrics::new().unwrap();
    let registry = RunRegistry::new(paths.registry_db());
    registry.ensure_schema().unwrap();
    let audit = AuditLog::new(paths.audit_log());
    let deps = ob_engine::EngineDeps::new(paths.clone(), metrics.clone());
    let orchestrator = Orchestrator::new(
        paths.run_logs_dir(),
        registry,
        audit,
        metrics.jobs_running.clone(),
        SystemClock,
    );

    Harness {
        state: AppState { deps, orchestrator },
        _dir: dir,
    }
}

async fn send(state: AppState, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, value)
}

fn get(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

fn get_authed(path: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header("x-ops-token", TOKEN)
        .body(Body::empty())
        .unwrap()
}

fn post_authed(path: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header("x-ops-token", TOKEN)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_needs_no_token() {
    let h = harness();
    let (status, body) = send(h.state.clone(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn metrics_needs_no_token() {
    let h = harness();
    let (status, body) = send(h.state.clone(), get("/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    let text = body.as_str().unwrap_or_default().to_string();
    assert!(text.contains("ops_jobs_running"), "body: {text}");
}

#[tokio::test]
async fn missing_token_is_forbidden() {
    let h = harness();
    let (status, _) = send(h.state.clone(), get("/cloud/remotes")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn wrong_token_is_forbidden() {
    let h = harness();
    let request = Request::builder()
        .uri("/cloud/remotes")
        .header("x-ops-token", "wrong")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(h.state.clone(), request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn token_with_surrounding_whitespace_in_file_still_matches() {
    // The file holds "test-token-123\n"; the trimmed value must match.
    let h = harness();
    let (status, _) = send(h.state.clone(), get_authed("/runs/nope/manifest")).await;
    // Auth passed; the run itself is unknown.
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_manifest_is_404() {
    let h = harness();
    let (status, body) = send(
        h.state.clone(),
        get_authed("/runs/20990101000000-ffffffff/manifest"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("manifest not found"));
}

#[tokio::test]
async fn unknown_run_log_is_404() {
    let h = harness();
    let (status, _) = send(
        h.state.clone(),
        get_authed("/runs/20990101000000-ffffffff/log"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_job_is_404() {
    let h = harness();
    let (status, body) = send(h.state.clone(), get_authed("/jobs/20990101000000-ffffffff")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("job not found"));
}

#[tokio::test]
async fn job_falls_back_to_the_durable_registry() {
    let h = harness();
    let clock = ob_core::FakeClock::new();
    let record = JobRecord::queued(
        JobId::mint(&clock),
        Action::Backup,
        serde_json::json!({"action": "backup"}),
        h.state.deps.paths.run_log("x"),
        clock.now_utc(),
    );
    h.state.orchestrator.registry().upsert(&record).unwrap();

    let (status, body) = send(
        h.state.clone(),
        get_authed(&format!("/jobs/{}", record.job_id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["job_id"], record.job_id.as_str());
    assert_eq!(body["action"], "backup");
    assert_eq!(body["status"], "queued");
}

#[tokio::test]
async fn backup_with_unknown_app_is_404_and_not_enqueued() {
    let h = harness();
    let (status, body) = send(
        h.state.clone(),
        post_authed("/actions/backup", serde_json::json!({"apps": ["nope"]})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("unknown app"));

    // No work directory and no run log came into being.
    let work_entries: Vec<_> = std::fs::read_dir(h.state.deps.paths.work_dir())
        .unwrap()
        .collect();
    assert!(work_entries.is_empty());
}

#[tokio::test]
async fn restore_with_lowercase_confirmation_is_400() {
    let h = harness();
    let (status, body) = send(
        h.state.clone(),
        post_authed(
            "/actions/restore",
            serde_json::json!({
                "run_id": "20260115120000-0a1b2c3d",
                "mode": "restore-db",
                "typed_confirmation": "restore 20260115120000-0a1b2c3d",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("typed confirmation mismatch"));
}

#[tokio::test]
async fn restore_with_unknown_mode_is_400() {
    let h = harness();
    let (status, _) = send(
        h.state.clone(),
        post_authed(
            "/actions/restore",
            serde_json::json!({
                "run_id": "20260115120000-0a1b2c3d",
                "mode": "wipe-everything",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_snapshot_without_run_id_is_400() {
    let h = harness();
    let (status, body) = send(
        h.state.clone(),
        post_authed(
            "/actions/upload/snapshot",
            serde_json::json!({"remote": "offsite"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("run_id"));
}

#[tokio::test]
async fn validate_with_unknown_run_is_404() {
    let h = harness();
    let (status, _) = send(
        h.state.clone(),
        post_authed(
            "/actions/validate",
            serde_json::json!({"run_id": "20990101000000-ffffffff"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn prune_enqueues_and_is_visible_in_memory() {
    let h = harness();
    let (status, body) = send(h.state.clone(), post_authed("/actions/prune", serde_json::json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"], "prune");
    assert_eq!(body["status"], "queued");

    let job_id = body["job_id"].as_str().unwrap().to_string();
    let (status, job) = send(h.state.clone(), get_authed(&format!("/jobs/{job_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(job["job_id"], job_id);
}
