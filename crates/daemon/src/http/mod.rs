// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP surface: routing, token auth, and the error contract.
//!
//! Everything except `/health` and `/metrics` sits behind the
//! `X-OPS-TOKEN` header, compared against the trimmed token file on
//! every request (the file is re-read like the apps config — rotations
//! need no restart).

pub mod actions;
pub mod queries;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use ob_core::SystemClock;
use ob_engine::{EngineDeps, Orchestrator};

#[derive(Clone)]
pub struct AppState {
    pub deps: EngineDeps,
    pub orchestrator: Orchestrator<SystemClock>,
}

pub fn router(state: AppState) -> Router {
    let authed = Router::new()
        .route("/status/apps", get(queries::status_apps))
        .route("/runs", get(queries::runs))
        .route("/jobs/{id}", get(queries::job))
        .route("/runs/{id}/manifest", get(queries::manifest))
        .route("/runs/{id}/log", get(queries::run_log))
        .route("/cloud/remotes", get(queries::remotes))
        .route("/cloud/test", post(actions::cloud_test))
        .route("/actions/backup", post(actions::backup))
        .route("/actions/validate", post(actions::validate))
        .route("/actions/prune", post(actions::prune))
        .route("/actions/restore", post(actions::restore))
        .route("/actions/export", post(actions::export))
        .route("/actions/upload/latest", post(actions::upload_latest))
        .route("/actions/upload/snapshot", post(actions::upload_snapshot))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/health", get(queries::health))
        .route("/metrics", get(queries::metrics))
        .merge(authed)
        .with_state(state)
}

/// Compare `X-OPS-TOKEN` against the trimmed token file.
async fn auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let presented = request
        .headers()
        .get("x-ops-token")
        .and_then(|v| v.to_str().ok());

    let expected = std::fs::read_to_string(state.deps.paths.token_file())
        .map_err(|_| ApiError::Forbidden)?;
    let expected = expected.trim();

    if expected.is_empty() || presented != Some(expected) {
        return Err(ApiError::Forbidden);
    }
    Ok(next.run(request).await)
}

/// The wire error contract: 400 bad argv, 403 auth, 404 unknown
/// app/run/job, 500 everything else.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Forbidden,
    NotFound(String),
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::Internal(msg) => msg,
            ApiError::Forbidden => "invalid or missing ops token",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message() }));
        (self.status(), body).into_response()
    }
}

impl From<ob_core::AppsError> for ApiError {
    fn from(err: ob_core::AppsError) -> Self {
        match err {
            ob_core::AppsError::UnknownApp(_) => ApiError::NotFound(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ob_core::ManifestError> for ApiError {
    fn from(err: ob_core::ManifestError) -> Self {
        match err {
            ob_core::ManifestError::NotFound(_) => ApiError::NotFound(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ob_engine::OrchestratorError> for ApiError {
    fn from(err: ob_engine::OrchestratorError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
