// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action endpoints: validate the request, then enqueue a job.
//!
//! Handlers surface only validation errors synchronously; everything
//! that can go wrong after the queue lands on the job record and is
//! visible via `GET /jobs/{id}` and the run log.

use super::{ApiError, AppState};
use axum::extract::State;
use axum::Json;
use ob_core::{
    BackupReq, CloudTestReq, ExportReq, JobRecord, Payload, RestoreReq, UploadReq, ValidateReq,
};
use ob_storage::TOKEN_ACTOR;

/// Decode a request body, mapping malformed input to 400 instead of the
/// extractor's default rejection.
fn decode<T: serde::de::DeserializeOwned>(body: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::BadRequest(e.to_string()))
}

async fn validate_remote(state: &AppState, remote: &str) -> Result<(), ApiError> {
    let rclone = state.deps.rclone.clone();
    let remote_owned = remote.to_string();
    let known = tokio::task::spawn_blocking(move || rclone.remote_exists(&remote_owned))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !known {
        return Err(ApiError::NotFound(format!("unknown remote: {remote}")));
    }
    Ok(())
}

pub async fn backup(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<JobRecord>, ApiError> {
    let req: BackupReq = decode(body)?;

    // Unknown app keys are rejected here: no job, no work directory.
    if req.apps.is_some() {
        state.deps.load_apps()?.resolve(req.apps.as_deref())?;
    }

    let deps = state.deps.clone();
    let pipeline_req = req.clone();
    let record = state.orchestrator.start(
        Payload::Backup(req),
        TOKEN_ACTOR,
        move |ctx| ob_engine::backup::run(&deps, ctx, &pipeline_req),
    )?;
    Ok(Json(record))
}

pub async fn validate(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<JobRecord>, ApiError> {
    let req: ValidateReq = decode(body)?;

    if let Some(run_id) = &req.run_id {
        if !state.deps.paths.manifest_path(run_id).is_file() {
            return Err(ApiError::NotFound(format!("run not found: {run_id}")));
        }
    }

    let deps = state.deps.clone();
    let pipeline_req = req.clone();
    let record = state.orchestrator.start(
        Payload::Validate(req),
        TOKEN_ACTOR,
        move |ctx| ob_engine::validate::run(&deps, ctx, &pipeline_req),
    )?;
    Ok(Json(record))
}

pub async fn prune(State(state): State<AppState>) -> Result<Json<JobRecord>, ApiError> {
    let deps = state.deps.clone();
    let record = state
        .orchestrator
        .start(Payload::Prune, TOKEN_ACTOR, move |ctx| {
            ob_engine::prune::run(&deps, ctx)
        })?;
    Ok(Json(record))
}

pub async fn restore(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<JobRecord>, ApiError> {
    // Mode outside the closed set fails decoding: 400, never enqueued.
    let req: RestoreReq = decode(body)?;

    if !req.confirmation_ok() {
        return Err(ApiError::BadRequest(format!(
            "typed confirmation mismatch: destructive restore requires the exact literal \"RESTORE {}\"",
            req.run_id
        )));
    }
    if req.apps.is_some() {
        state.deps.load_apps()?.resolve(req.apps.as_deref())?;
    }

    let deps = state.deps.clone();
    let pipeline_req = req.clone();
    let record = state.orchestrator.start(
        Payload::Restore(req),
        TOKEN_ACTOR,
        move |ctx| ob_engine::restore::run(&deps, ctx, &pipeline_req),
    )?;
    Ok(Json(record))
}

pub async fn export(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<JobRecord>, ApiError> {
    let req: ExportReq = decode(body)?;

    let restore_req = RestoreReq {
        run_id: req.run_id.clone(),
        mode: ob_core::RestoreMode::ExportBundle,
        apps: None,
        typed_confirmation: None,
        allow_same_server: false,
    };

    let deps = state.deps.clone();
    let record = state.orchestrator.start(
        Payload::ExportBundle(req),
        TOKEN_ACTOR,
        move |ctx| ob_engine::restore::run(&deps, ctx, &restore_req),
    )?;
    Ok(Json(record))
}

pub async fn upload_latest(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<JobRecord>, ApiError> {
    let mut req: UploadReq = decode(body)?;
    req.run_id = None;
    validate_remote(&state, &req.remote).await?;

    let deps = state.deps.clone();
    let pipeline_req = req.clone();
    let record = state.orchestrator.start(
        Payload::UploadLatest(req),
        TOKEN_ACTOR,
        move |ctx| ob_engine::upload::run(&deps, ctx, &pipeline_req),
    )?;
    Ok(Json(record))
}

pub async fn upload_snapshot(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<JobRecord>, ApiError> {
    let req: UploadReq = decode(body)?;
    let Some(run_id) = req.run_id.clone() else {
        return Err(ApiError::BadRequest("run_id is required".to_string()));
    };
    if !state.deps.paths.manifest_path(&run_id).is_file() {
        return Err(ApiError::NotFound(format!("run not found: {run_id}")));
    }
    validate_remote(&state, &req.remote).await?;

    let deps = state.deps.clone();
    let pipeline_req = req.clone();
    let record = state.orchestrator.start(
        Payload::UploadSnapshot(req),
        TOKEN_ACTOR,
        move |ctx| ob_engine::upload::run(&deps, ctx, &pipeline_req),
    )?;
    Ok(Json(record))
}

pub async fn cloud_test(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<JobRecord>, ApiError> {
    let req: CloudTestReq = decode(body)?;
    validate_remote(&state, &req.remote).await?;

    let deps = state.deps.clone();
    let pipeline_req = req.clone();
    let record = state.orchestrator.start(
        Payload::RcloneTest(req),
        TOKEN_ACTOR,
        move |ctx| ob_engine::upload::cloud_test(&deps, ctx, &pipeline_req),
    )?;
    Ok(Json(record))
}
