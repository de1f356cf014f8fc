// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The deduplicating snapshot store.
//!
//! Every invocation points at the repo with `-r` and unlocks it through
//! `RESTIC_PASSWORD_FILE`; the password itself never appears in argv.

use ob_proc::{Cmd, CmdOutput, ProcError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const RESTIC_BIN: &str = "restic";

/// Snapshot retention for prune: keep the last N daily, weekly and
/// monthly snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retention {
    pub daily: u32,
    pub weekly: u32,
    pub monthly: u32,
}

impl Default for Retention {
    fn default() -> Self {
        Self {
            daily: 14,
            weekly: 8,
            monthly: 12,
        }
    }
}

/// One snapshot as reported by `restic snapshots --json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: String,
    #[serde(default)]
    pub short_id: String,
    pub time: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub paths: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Restic {
    repo: PathBuf,
    password_file: PathBuf,
}

impl Restic {
    pub fn new(repo: impl Into<PathBuf>, password_file: impl Into<PathBuf>) -> Self {
        Self {
            repo: repo.into(),
            password_file: password_file.into(),
        }
    }

    pub fn repo(&self) -> &Path {
        &self.repo
    }

    fn cmd(&self, args: Vec<String>, log: Option<&Path>) -> Cmd {
        let mut argv = vec![
            RESTIC_BIN.to_string(),
            "-r".to_string(),
            self.repo.to_string_lossy().into_owned(),
        ];
        argv.extend(args);
        let mut cmd = Cmd::new(argv).env(
            "RESTIC_PASSWORD_FILE",
            self.password_file.to_string_lossy().into_owned(),
        );
        if let Some(log) = log {
            cmd = cmd.log(log);
        }
        cmd
    }

    /// An initialized repo has a `config` object under its root.
    pub fn is_initialized(&self) -> bool {
        self.repo.join("config").exists()
    }

    /// Initialize the repo if needed. Idempotent.
    pub fn ensure_init(&self, log: Option<&Path>) -> Result<(), ProcError> {
        if self.is_initialized() {
            return Ok(());
        }
        self.cmd(vec!["init".to_string()], log).run()?;
        Ok(())
    }

    pub(crate) fn backup_args(dir: &Path, tags: &[String]) -> Vec<String> {
        let mut args = vec!["backup".to_string(), dir.to_string_lossy().into_owned()];
        for tag in tags {
            args.push("--tag".to_string());
            args.push(tag.clone());
        }
        args
    }

    /// Snapshot a directory with the given tags, in the given order.
    pub fn backup(&self, dir: &Path, tags: &[String], log: &Path) -> Result<(), ProcError> {
        self.cmd(Self::backup_args(dir, tags), Some(log)).run()?;
        Ok(())
    }

    /// All snapshots, optionally filtered by tag, oldest first.
    pub fn snapshots(&self, tag: Option<&str>) -> Result<Vec<Snapshot>, ResticError> {
        let mut args = vec!["snapshots".to_string(), "--json".to_string()];
        if let Some(tag) = tag {
            args.push("--tag".to_string());
            args.push(tag.to_string());
        }
        let out = self.cmd(args, None).run()?;
        parse_snapshots(&out.stdout)
    }

    /// The snapshot holding a run's work directory: the last one tagged
    /// `run:<run_id>`.
    pub fn snapshot_for_run(&self, run_id: &str) -> Result<Option<Snapshot>, ResticError> {
        Ok(self
            .snapshots(Some(&format!("run:{run_id}")))?
            .into_iter()
            .last())
    }

    /// Restore the latest snapshot tagged `run:<run_id>` into `target`.
    /// The restored tree embeds the original absolute path.
    pub fn restore_run(&self, run_id: &str, target: &Path, log: &Path) -> Result<(), ProcError> {
        self.cmd(
            vec![
                "restore".to_string(),
                "latest".to_string(),
                "--tag".to_string(),
                format!("run:{run_id}"),
                "--target".to_string(),
                target.to_string_lossy().into_owned(),
            ],
            Some(log),
        )
        .run()?;
        Ok(())
    }

    /// Structural check plus a 1/20 sample of pack data.
    pub fn check_subset(&self, log: &Path) -> Result<CmdOutput, ProcError> {
        self.cmd(
            vec!["check".to_string(), "--read-data-subset=1/20".to_string()],
            Some(log),
        )
        .run()
    }

    pub(crate) fn forget_args(keep: Retention) -> Vec<String> {
        vec![
            "forget".to_string(),
            "--keep-daily".to_string(),
            keep.daily.to_string(),
            "--keep-weekly".to_string(),
            keep.weekly.to_string(),
            "--keep-monthly".to_string(),
            keep.monthly.to_string(),
            "--prune".to_string(),
        ]
    }

    /// Apply the retention policy and prune unreferenced data.
    pub fn forget_and_prune(&self, keep: Retention, log: &Path) -> Result<CmdOutput, ProcError> {
        self.cmd(Self::forget_args(keep), Some(log)).run()
    }
}

pub(crate) fn parse_snapshots(stdout: &str) -> Result<Vec<Snapshot>, ResticError> {
    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(stdout.trim()).map_err(ResticError::Parse)
}

#[derive(Debug, Error)]
pub enum ResticError {
    #[error(transparent)]
    Tool(#[from] ProcError),

    #[error("failed to parse restic snapshot list: {0}")]
    Parse(#[source] serde_json::Error),
}

#[cfg(test)]
#[path = "restic_tests.rs"]
mod tests;
