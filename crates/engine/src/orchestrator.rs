// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job orchestrator: queue → run → terminal, with dual persistence.
//!
//! The in-memory map is the live view; every transition is mirrored to
//! the durable registry before its audit line is written, so a reader
//! observing the audit log can always fetch the matching record. The
//! map's mutex guards only field updates — pipeline work never runs
//! under it.

use crate::error::PipelineError;
use ob_core::{Clock, JobId, JobRecord, JobStatus, Payload, SystemClock};
use ob_storage::{AuditEntry, AuditLog, RunLog, RunRegistry};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// What a pipeline gets to know about its job.
#[derive(Debug, Clone)]
pub struct JobCtx {
    pub job_id: JobId,
    pub log_path: PathBuf,
}

/// Cheap to clone; all clones share the same job map and stores.
#[derive(Clone)]
pub struct Orchestrator<C: Clock = SystemClock> {
    inner: Arc<Inner<C>>,
}

struct Inner<C: Clock> {
    jobs: Mutex<HashMap<JobId, JobRecord>>,
    run_logs_dir: PathBuf,
    registry: RunRegistry,
    audit: AuditLog,
    jobs_running: prometheus::IntGauge,
    clock: C,
}

impl<C: Clock + 'static> Orchestrator<C> {
    pub fn new(
        run_logs_dir: PathBuf,
        registry: RunRegistry,
        audit: AuditLog,
        jobs_running: prometheus::IntGauge,
        clock: C,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                jobs: Mutex::new(HashMap::new()),
                run_logs_dir,
                registry,
                audit,
                jobs_running,
                clock,
            }),
        }
    }

    /// The live record, if this daemon created the job.
    pub fn get(&self, job_id: &str) -> Option<JobRecord> {
        self.inner.jobs.lock().get(job_id).cloned()
    }

    /// Durable fallback for jobs no longer in memory.
    pub fn registry(&self) -> &RunRegistry {
        &self.inner.registry
    }

    /// Enqueue a job and dispatch its worker.
    ///
    /// Unknown actions cannot reach this point: [`Payload`] is a closed
    /// enum, so the allow-list is enforced by construction at the HTTP
    /// boundary. The queued record lands in the in-memory map and the
    /// durable registry before the audit line is emitted and before the
    /// worker can observe it.
    pub fn start<F>(
        &self,
        payload: Payload,
        actor: &str,
        pipeline: F,
    ) -> Result<JobRecord, OrchestratorError>
    where
        F: FnOnce(&JobCtx) -> Result<serde_json::Value, PipelineError> + Send + 'static,
    {
        let action = payload.action();
        let now = self.inner.clock.now_utc();
        let job_id = JobId::mint(&self.inner.clock);
        let log_path = self.inner.run_logs_dir.join(format!("{job_id}.log"));
        let record = JobRecord::queued(job_id, action, payload.to_value(), log_path.clone(), now);

        self.inner.jobs.lock().insert(job_id, record.clone());
        self.inner.registry.upsert(&record)?;
        self.audit(&record, "queued", actor, record.payload.clone());
        info!(job_id = %job_id, action = %action, "job queued");

        let this = self.clone();
        let actor = actor.to_string();
        tokio::task::spawn_blocking(move || {
            this.run_job(JobCtx { job_id, log_path }, &actor, pipeline);
        });

        Ok(record)
    }

    fn run_job<F>(&self, ctx: JobCtx, actor: &str, pipeline: F)
    where
        F: FnOnce(&JobCtx) -> Result<serde_json::Value, PipelineError>,
    {
        let _ = self.transition(ctx.job_id, JobStatus::Running, None, None);
        self.inner.jobs_running.inc();

        let outcome = pipeline(&ctx);

        match outcome {
            Ok(result) => {
                if let Some(record) =
                    self.transition(ctx.job_id, JobStatus::Success, Some(result.clone()), None)
                {
                    self.audit(&record, "success", actor, result);
                }
                info!(job_id = %ctx.job_id, "job succeeded");
            }
            Err(err) => {
                let message = err.to_string();
                let record = self.transition(
                    ctx.job_id,
                    JobStatus::Failed,
                    None,
                    Some(message.clone()),
                );
                if let Err(e) = RunLog::new(&ctx.log_path).append_line(&format!("ERROR: {message}"))
                {
                    warn!(job_id = %ctx.job_id, error = %e, "failed to append run log");
                }
                if let Some(record) = record {
                    self.audit(
                        &record,
                        "failed",
                        actor,
                        serde_json::json!({ "error": message }),
                    );
                }
                warn!(job_id = %ctx.job_id, error = %message, "job failed");
            }
        }

        self.inner.jobs_running.dec();
    }

    /// Apply a status change under the map lock, then mirror it to the
    /// durable registry. The lock never spans the registry write.
    fn transition(
        &self,
        job_id: JobId,
        status: JobStatus,
        result: Option<serde_json::Value>,
        error: Option<String>,
    ) -> Option<JobRecord> {
        let now = self.inner.clock.now_utc();
        let record = {
            let mut jobs = self.inner.jobs.lock();
            let record = jobs.get_mut(job_id.as_str())?;
            record.transition(status, now);
            if let Some(result) = result {
                record.result = Some(result);
            }
            if let Some(error) = error {
                record.error = Some(error);
            }
            record.clone()
        };
        if let Err(e) = self.inner.registry.upsert(&record) {
            warn!(job_id = %job_id, error = %e, "failed to persist job transition");
        }
        Some(record)
    }

    fn audit(&self, record: &JobRecord, status: &str, actor: &str, details: serde_json::Value) {
        let entry = AuditEntry {
            time: self.inner.clock.now_utc(),
            action: record.action.as_str().to_string(),
            status: status.to_string(),
            actor: actor.to_string(),
            details: serde_json::json!({
                "job_id": record.job_id.as_str(),
                "details": details,
            }),
        };
        if let Err(e) = self.inner.audit.append(&entry) {
            warn!(job_id = %record.job_id, error = %e, "failed to append audit log");
        }
    }
}

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Registry(#[from] ob_storage::RegistryError),
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
