// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup: directories, the exclusive PID lock, durable schema,
//! repo init, and engine wiring.

use crate::config::Config;
use fs2::FileExt;
use ob_core::SystemClock;
use ob_engine::{EngineDeps, Metrics, Orchestrator};
use ob_storage::{AuditLog, RunRegistry};
use std::fs::File;
use std::io::Write;
use std::time::Instant;
use thiserror::Error;
use tracing::info;

pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): held to maintain the exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub deps: EngineDeps,
    pub orchestrator: Orchestrator<SystemClock>,
    pub start_time: Instant,
}

impl std::fmt::Debug for DaemonState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DaemonState")
            .field("config", &self.config)
            .field("start_time", &self.start_time)
            .finish_non_exhaustive()
    }
}

/// Bring the daemon up. Lock first: a second instance must fail before
/// it can touch anything.
pub fn startup(config: Config) -> Result<DaemonState, LifecycleError> {
    config.paths.ensure_tree()?;

    // Open without truncating — the file may hold the live daemon's PID.
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    // Truncate now that we hold the lock, then write our PID.
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    let metrics = Metrics::new()?;
    let registry = RunRegistry::new(config.paths.registry_db());
    registry.ensure_schema()?;
    let audit = AuditLog::new(config.paths.audit_log());

    let deps = EngineDeps::new(config.paths.clone(), metrics.clone());
    deps.restic.ensure_init(None)?;

    let orchestrator = Orchestrator::new(
        config.paths.run_logs_dir(),
        registry,
        audit,
        metrics.jobs_running.clone(),
        SystemClock,
    );

    info!(
        ops_dir = %config.paths.ops_dir.display(),
        backup_root = %config.paths.backup_root.display(),
        host = %deps.host,
        "daemon ready"
    );

    Ok(DaemonState {
        config,
        lock_file,
        deps,
        orchestrator,
        start_time: Instant::now(),
    })
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("i/o error during startup: {0}")]
    Io(#[from] std::io::Error),

    #[error("another daemon holds the lock: {0}")]
    LockFailed(#[source] std::io::Error),

    #[error("failed to prepare durable registry: {0}")]
    Registry(#[from] ob_storage::RegistryError),

    #[error("failed to build metric registry: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("failed to initialize snapshot repo: {0}")]
    RepoInit(#[from] ob_proc::ProcError),
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
