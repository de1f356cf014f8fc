// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared pipeline dependencies, threaded through handlers as one value.

use crate::metrics::Metrics;
use ob_adapters::{AgeTool, Archiver, Docker, Rclone, Restic};
use ob_core::{AppsError, AppsFile, OpsPaths};

/// Everything a pipeline needs besides its request: the filesystem
/// layout, the external tool adapters, the metric registry and the
/// host's nodename.
#[derive(Clone)]
pub struct EngineDeps {
    pub paths: OpsPaths,
    pub restic: Restic,
    pub docker: Docker,
    pub archiver: Archiver,
    pub age: AgeTool,
    pub rclone: Rclone,
    pub metrics: Metrics,
    pub host: String,
}

impl EngineDeps {
    pub fn new(paths: OpsPaths, metrics: Metrics) -> Self {
        let restic = Restic::new(paths.repo_dir(), paths.restic_password_file());
        let age = AgeTool::new(paths.age_key_file());
        let rclone = Rclone::new(paths.rclone_conf());
        Self {
            paths,
            restic,
            docker: Docker::new(),
            archiver: Archiver::new(),
            age,
            rclone,
            metrics,
            host: nodename(),
        }
    }

    /// Read `apps.yml`. Called per use, never cached.
    pub fn load_apps(&self) -> Result<AppsFile, AppsError> {
        AppsFile::load(&self.paths.apps_file())
    }
}

fn nodename() -> String {
    hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
#[path = "deps_tests.rs"]
mod tests;
