// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The validate pipeline: artifact re-hash, archive self-tests, and a
//! repo subset check.
//!
//! All artifact checks are collected before anything is judged — a bad
//! artifact yields `ok: false` in the report rather than aborting the
//! job. Only a repo-check execution failure fails the job itself.

use crate::backup::sha256_file;
use crate::deps::EngineDeps;
use crate::error::PipelineError;
use crate::orchestrator::JobCtx;
use ob_core::{Manifest, ValidateReq};
use std::path::Path;

/// How much of the repo check output lands in the result.
const REPO_CHECK_TAIL: usize = 1_000;

pub fn run(
    deps: &EngineDeps,
    ctx: &JobCtx,
    req: &ValidateReq,
) -> Result<serde_json::Value, PipelineError> {
    let log = ctx.log_path.as_path();

    let mut checks: Vec<serde_json::Value> = Vec::new();
    let mut all_ok = true;

    if let Some(run_id) = &req.run_id {
        let manifest = Manifest::load(&deps.paths.manifest_path(run_id))?;
        for artifact in &manifest.artifacts {
            let ok = check_artifact(deps, &artifact.path, &artifact.sha256, log);
            all_ok &= ok;
            checks.push(serde_json::json!({
                "path": artifact.path,
                "ok": ok,
            }));
        }
    }

    let repo = deps.restic.check_subset(log)?;
    let combined = format!("{}{}", repo.stdout, repo.stderr);

    Ok(serde_json::json!({
        "ok": all_ok,
        "checks": checks,
        "repo_check": tail(&combined, REPO_CHECK_TAIL),
    }))
}

/// One artifact's verdict: present, hash unchanged, and (for archives)
/// self-test clean.
fn check_artifact(deps: &EngineDeps, path: &Path, expected_sha256: &str, log: &Path) -> bool {
    if !path.exists() {
        return false;
    }
    match sha256_file(path) {
        Ok(actual) if actual == expected_sha256 => {}
        _ => return false,
    }

    let name = path.to_string_lossy();
    if name.ends_with(".gz") {
        return deps.archiver.gzip_test(path, log).is_ok();
    }
    if name.ends_with(".tar.zst") {
        return deps.archiver.selftest(path, log).is_ok();
    }
    // Encrypted bundles and anything else: the hash is the check.
    true
}

/// The last `n` bytes of `s`, nudged forward to a char boundary.
pub(crate) fn tail(s: &str, n: usize) -> &str {
    if s.len() <= n {
        return s;
    }
    let mut start = s.len() - n;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
