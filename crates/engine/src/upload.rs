// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replication: copy run metadata trees to a named remote.

use crate::deps::EngineDeps;
use crate::error::PipelineError;
use crate::orchestrator::JobCtx;
use crate::runs::latest_run_id;
use crate::validate::tail;
use ob_core::{CloudTestReq, UploadReq};
use tracing::info;

pub fn run(
    deps: &EngineDeps,
    ctx: &JobCtx,
    req: &UploadReq,
) -> Result<serde_json::Value, PipelineError> {
    let log = ctx.log_path.as_path();

    if !deps.rclone.remote_exists(&req.remote)? {
        return Err(PipelineError::UnknownRemote(req.remote.clone()));
    }

    let run_id = match &req.run_id {
        Some(id) => {
            if !deps.paths.manifest_path(id).is_file() {
                return Err(PipelineError::RunNotFound(id.clone()));
            }
            id.clone()
        }
        None => latest_run_id(&deps.paths)?.ok_or(PipelineError::NoRuns)?,
    };

    let src = deps.paths.run_meta_dir(&run_id);
    let dest = format!("{}/{}", req.remote_path, run_id);
    deps.rclone.copy(&src, &req.remote, &dest, log)?;

    info!(run_id, remote = %req.remote, dest, "run metadata uploaded");
    Ok(serde_json::json!({
        "run_id": run_id,
        "remote": req.remote,
        "dest": dest,
    }))
}

/// `rclone_test`: prove the remote resolves and its root lists.
pub fn cloud_test(
    deps: &EngineDeps,
    ctx: &JobCtx,
    req: &CloudTestReq,
) -> Result<serde_json::Value, PipelineError> {
    if !deps.rclone.remote_exists(&req.remote)? {
        return Err(PipelineError::UnknownRemote(req.remote.clone()));
    }
    let out = deps.rclone.lsd_root(&req.remote, ctx.log_path.as_path())?;
    Ok(serde_json::json!({
        "remote": req.remote,
        "listing": tail(&out.stdout, 1_000),
    }))
}

#[cfg(test)]
#[path = "upload_tests.rs"]
mod tests;
