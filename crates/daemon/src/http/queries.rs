// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only endpoints.

use super::{ApiError, AppState};
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use ob_core::Manifest;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": Utc::now(),
    }))
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.deps.metrics.render(),
    )
}

pub async fn status_apps(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let statuses = tokio::task::spawn_blocking(move || {
        ob_engine::status::status_apps(&state.deps)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?
    .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(serde_json::json!({ "apps": statuses })))
}

/// All manifests (newest first) plus the repo's snapshot list.
pub async fn runs(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let (manifests, snapshots) = tokio::task::spawn_blocking(move || {
        let manifests = ob_engine::runs::list_manifests(&state.deps.paths)
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        let snapshots = state
            .deps
            .restic
            .snapshots(None)
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        Ok::<_, ApiError>((manifests, snapshots))
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Json(serde_json::json!({
        "manifests": manifests,
        "snapshots": snapshots,
    })))
}

/// In-memory record, durable fallback, then 404.
pub async fn job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if let Some(record) = state.orchestrator.get(&id) {
        return Ok(Json(
            serde_json::to_value(&record).map_err(|e| ApiError::Internal(e.to_string()))?,
        ));
    }

    let row = state
        .orchestrator
        .registry()
        .get(&id)
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound(format!("job not found: {id}")))?;

    Ok(Json(serde_json::json!({
        "job_id": row.job_id,
        "action": row.action,
        "status": row.status,
        "created_at": row.created_at,
        "updated_at": row.updated_at,
        "payload": row.payload,
        "log_path": state.deps.paths.run_log(&id),
    })))
}

pub async fn manifest(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Manifest>, ApiError> {
    let manifest = Manifest::load(&state.deps.paths.manifest_path(&id))?;
    Ok(Json(manifest))
}

pub async fn run_log(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let path = state.deps.paths.run_log(&id);
    let text = std::fs::read_to_string(&path)
        .map_err(|_| ApiError::NotFound(format!("run log not found: {id}")))?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}

pub async fn remotes(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let remotes = tokio::task::spawn_blocking(move || state.deps.rclone.list_remotes())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(serde_json::json!({ "remotes": remotes })))
}
