// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run metadata listings shared by the HTTP surface and replication.

use crate::error::PipelineError;
use ob_core::{Manifest, OpsPaths};

/// Run ids under `META/runs` that actually have a manifest, ascending.
/// The id's timestamp prefix makes this creation order.
pub fn run_ids_with_manifest(paths: &OpsPaths) -> Result<Vec<String>, PipelineError> {
    let runs_dir = paths.runs_dir();
    let entries = match std::fs::read_dir(&runs_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(PipelineError::io(&runs_dir)(source)),
    };

    let mut ids = Vec::new();
    for entry in entries {
        let entry = entry.map_err(PipelineError::io(&runs_dir))?;
        let id = entry.file_name().to_string_lossy().into_owned();
        if paths.manifest_path(&id).is_file() {
            ids.push(id);
        }
    }
    ids.sort();
    Ok(ids)
}

/// The lexicographically greatest run id with a manifest.
pub fn latest_run_id(paths: &OpsPaths) -> Result<Option<String>, PipelineError> {
    Ok(run_ids_with_manifest(paths)?.pop())
}

/// All manifests, newest first. Unreadable manifests are skipped.
pub fn list_manifests(paths: &OpsPaths) -> Result<Vec<Manifest>, PipelineError> {
    let mut ids = run_ids_with_manifest(paths)?;
    ids.reverse();
    Ok(ids
        .iter()
        .filter_map(|id| Manifest::load(&paths.manifest_path(id)).ok())
        .collect())
}

#[cfg(test)]
#[path = "runs_tests.rs"]
mod tests;
