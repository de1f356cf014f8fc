// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The agent's filesystem layout, derived from two roots.

use std::path::{Path, PathBuf};

pub const DEFAULT_OPS_DIR: &str = "/srv/ops";
pub const DEFAULT_BACKUP_ROOT: &str = "/srv/backups";

/// Every path the agent touches, hung off the ops dir (config + logs)
/// and the backup root (work tree, run metadata, restic repo).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpsPaths {
    pub ops_dir: PathBuf,
    pub backup_root: PathBuf,
}

impl OpsPaths {
    pub fn new(ops_dir: impl Into<PathBuf>, backup_root: impl Into<PathBuf>) -> Self {
        Self {
            ops_dir: ops_dir.into(),
            backup_root: backup_root.into(),
        }
    }

    /// Roots from `OPS_DIR` / `OPS_BACKUP_ROOT`, with the production
    /// defaults when unset.
    pub fn from_env() -> Self {
        let ops_dir = std::env::var("OPS_DIR").unwrap_or_else(|_| DEFAULT_OPS_DIR.to_string());
        let backup_root =
            std::env::var("OPS_BACKUP_ROOT").unwrap_or_else(|_| DEFAULT_BACKUP_ROOT.to_string());
        Self::new(ops_dir, backup_root)
    }

    // --- config ---

    pub fn config_dir(&self) -> PathBuf {
        self.ops_dir.join("config")
    }

    pub fn apps_file(&self) -> PathBuf {
        self.config_dir().join("apps.yml")
    }

    pub fn token_file(&self) -> PathBuf {
        self.config_dir().join("ops_token.txt")
    }

    pub fn restic_password_file(&self) -> PathBuf {
        self.config_dir().join("restic_password.txt")
    }

    pub fn age_key_file(&self) -> PathBuf {
        self.config_dir().join("age.key")
    }

    pub fn rclone_conf(&self) -> PathBuf {
        self.config_dir().join("rclone.conf")
    }

    // --- logs ---

    pub fn logs_dir(&self) -> PathBuf {
        self.ops_dir.join("logs")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.logs_dir().join("audit.log")
    }

    pub fn run_logs_dir(&self) -> PathBuf {
        self.logs_dir().join("runs")
    }

    pub fn run_log(&self, job_id: &str) -> PathBuf {
        self.run_logs_dir().join(format!("{job_id}.log"))
    }

    // --- work tree ---

    pub fn work_dir(&self) -> PathBuf {
        self.backup_root.join("work")
    }

    pub fn job_work_dir(&self, job_id: &str) -> PathBuf {
        self.work_dir().join(job_id)
    }

    // --- run metadata ---

    pub fn meta_dir(&self) -> PathBuf {
        self.backup_root.join("meta")
    }

    pub fn runs_dir(&self) -> PathBuf {
        self.meta_dir().join("runs")
    }

    pub fn run_meta_dir(&self, job_id: &str) -> PathBuf {
        self.runs_dir().join(job_id)
    }

    pub fn manifest_path(&self, job_id: &str) -> PathBuf {
        self.run_meta_dir(job_id).join("manifest.json")
    }

    pub fn checksums_path(&self, job_id: &str) -> PathBuf {
        self.run_meta_dir(job_id).join("checksums.sha256")
    }

    pub fn registry_db(&self) -> PathBuf {
        self.meta_dir().join("backups.sqlite")
    }

    pub fn restore_bundle(&self, run_id: &str) -> PathBuf {
        self.meta_dir().join(format!("restore_bundle_{run_id}.tar.zst"))
    }

    // --- repo ---

    pub fn repo_dir(&self) -> PathBuf {
        self.backup_root.join("restic_repo")
    }

    /// Create every directory the daemon expects to exist.
    pub fn ensure_tree(&self) -> std::io::Result<()> {
        for dir in [
            self.config_dir(),
            self.run_logs_dir(),
            self.work_dir(),
            self.runs_dir(),
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Where a restic restore of a run's snapshot materializes inside a
    /// scratch target: the snapshot embeds the original absolute path.
    pub fn embedded_work_dir(&self, restore_target: &Path, run_id: &str) -> PathBuf {
        let embedded = self.job_work_dir(run_id);
        let relative = embedded
            .strip_prefix("/")
            .map(Path::to_path_buf)
            .unwrap_or(embedded);
        restore_target.join(relative)
    }
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
