// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for process execution.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcError {
    #[error("empty command")]
    EmptyArgv,

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A checked command exited non-zero.
    #[error("command failed with exit code {exit}: {argv}: {stderr}")]
    Failed {
        argv: String,
        exit: i32,
        stderr: String,
    },

    #[error("failed to open redirect target {path}: {source}")]
    Redirect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to append run log {path}: {source}")]
    Log {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("i/o error waiting on {argv}: {source}")]
    Wait {
        argv: String,
        #[source]
        source: std::io::Error,
    },
}
