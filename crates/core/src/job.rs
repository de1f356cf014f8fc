// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job actions, status state machine, and the job record.

use crate::id::JobId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Everything a job is allowed to do. Closed allow-list: anything else
/// is rejected before a record is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Backup,
    Validate,
    Prune,
    Restore,
    ExportBundle,
    UploadLatest,
    UploadSnapshot,
    RcloneTest,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::Backup,
        Action::Validate,
        Action::Prune,
        Action::Restore,
        Action::ExportBundle,
        Action::UploadLatest,
        Action::UploadSnapshot,
        Action::RcloneTest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Backup => "backup",
            Action::Validate => "validate",
            Action::Prune => "prune",
            Action::Restore => "restore",
            Action::ExportBundle => "export_bundle",
            Action::UploadLatest => "upload_latest",
            Action::UploadSnapshot => "upload_snapshot",
            Action::RcloneTest => "rclone_test",
        }
    }

    pub fn parse(s: &str) -> Result<Self, UnknownAction> {
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown action: {0}")]
pub struct UnknownAction(pub String);

/// Job lifecycle: `queued → running → success | failed`.
///
/// No resumption and no cancellation; a crashed `running` job stays
/// `running` in the durable registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Success,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Success => "success",
            JobStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(JobStatus::Queued),
            "running" => Some(JobStatus::Running),
            "success" => Some(JobStatus::Success),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One job. Created by the HTTP handler, mutated only by the orchestrator
/// worker running it, destroyed never (the durable registry keeps every
/// record).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: JobId,
    pub action: Action,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub payload: serde_json::Value,
    pub log_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobRecord {
    pub fn queued(
        job_id: JobId,
        action: Action,
        payload: serde_json::Value,
        log_path: PathBuf,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            job_id,
            action,
            status: JobStatus::Queued,
            created_at: now,
            updated_at: now,
            payload,
            log_path,
            result: None,
            error: None,
        }
    }

    /// Advance the status and stamp `updated_at`.
    pub fn transition(&mut self, status: JobStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
