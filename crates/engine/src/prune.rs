// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retention pruning of the repo.

use crate::deps::EngineDeps;
use crate::error::PipelineError;
use crate::orchestrator::JobCtx;
use crate::validate::tail;
use ob_adapters::Retention;

pub fn run(deps: &EngineDeps, ctx: &JobCtx) -> Result<serde_json::Value, PipelineError> {
    let keep = Retention::default();
    let out = deps
        .restic
        .forget_and_prune(keep, ctx.log_path.as_path())?;
    Ok(serde_json::json!({
        "keep_daily": keep.daily,
        "keep_weekly": keep.weekly,
        "keep_monthly": keep.monthly,
        "output": tail(&out.stdout, 1_000),
    }))
}
