// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline failure taxonomy.
//!
//! Anything that escapes a pipeline becomes the job's `error` string, so
//! every variant's Display is written for the operator reading
//! `/jobs/{id}`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Tool(#[from] ob_proc::ProcError),

    #[error(transparent)]
    Restic(#[from] ob_adapters::ResticError),

    #[error(transparent)]
    Apps(#[from] ob_core::AppsError),

    #[error(transparent)]
    Manifest(#[from] ob_core::ManifestError),

    #[error("run not found: {0}")]
    RunNotFound(String),

    #[error("no runs with manifests to upload")]
    NoRuns,

    #[error("unknown remote: {0}")]
    UnknownRemote(String),

    #[error("typed confirmation mismatch: expected \"RESTORE <run_id>\" exactly")]
    ConfirmationMismatch,

    #[error("same-server database restore refused; set allow_same_server to override")]
    SameServerRefused,

    #[error("refusing restore: database {db} is not empty ({tables} tables)")]
    TargetNotEmpty { db: String, tables: u64 },

    #[error("restore source not materialized at {0}")]
    SourceMissing(PathBuf),

    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
