// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The container runtime: database dumps and restores execute inside
//! the app's database container; status comes from `docker inspect`.

use ob_proc::{Cmd, Pipeline, ProcError};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DOCKER_BIN: &str = "docker";

const TABLE_COUNT_SQL: &str =
    "SELECT count(*) FROM information_schema.tables WHERE table_schema = 'public'";

/// Inspection result for one configured container.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerStatus {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ContainerStatus {
    pub fn not_found(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: "not_found".to_string(),
            health: None,
            started_at: None,
            image: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Docker;

impl Docker {
    pub fn new() -> Self {
        Self
    }

    pub(crate) fn dump_stage(container: &str, user: &str, db: &str) -> Vec<String> {
        vec![
            DOCKER_BIN.to_string(),
            "exec".to_string(),
            container.to_string(),
            "pg_dump".to_string(),
            "-U".to_string(),
            user.to_string(),
            db.to_string(),
        ]
    }

    /// Stream a database dump through gzip into `out`:
    /// `docker exec <c> pg_dump -U <u> <db> | gzip > out`.
    pub fn dump_db(
        &self,
        container: &str,
        user: &str,
        db: &str,
        out: &Path,
        log: &Path,
    ) -> Result<(), ProcError> {
        Pipeline::new()
            .stage(Self::dump_stage(container, user, db))
            .stage(["gzip"])
            .stdout_to(out)
            .log(log)
            .run()?;
        Ok(())
    }

    /// Number of tables in the target database's public schema.
    ///
    /// A count that cannot be parsed reads as `u64::MAX` so callers
    /// treat the database as non-empty and refuse to overwrite it.
    pub fn table_count(
        &self,
        container: &str,
        user: &str,
        db: &str,
        log: &Path,
    ) -> Result<u64, ProcError> {
        let out = Cmd::new([
            DOCKER_BIN,
            "exec",
            container,
            "psql",
            "-U",
            user,
            "-d",
            db,
            "-tAc",
            TABLE_COUNT_SQL,
        ])
        .log(log)
        .run()?;
        Ok(out.stdout.trim().parse().unwrap_or(u64::MAX))
    }

    /// Stream a gzipped dump back into the container's SQL client:
    /// `gzip -dc <dump> | docker exec -i <c> psql -U <u> -d <db>`.
    pub fn restore_db(
        &self,
        container: &str,
        user: &str,
        db: &str,
        dump_gz: &Path,
        log: &Path,
    ) -> Result<(), ProcError> {
        Pipeline::new()
            .stage([
                "gzip".to_string(),
                "-dc".to_string(),
                dump_gz.to_string_lossy().into_owned(),
            ])
            .stage([
                DOCKER_BIN.to_string(),
                "exec".to_string(),
                "-i".to_string(),
                container.to_string(),
                "psql".to_string(),
                "-U".to_string(),
                user.to_string(),
                "-d".to_string(),
                db.to_string(),
            ])
            .log(log)
            .run()?;
        Ok(())
    }

    /// Inspect one container. Missing containers are a status, not an
    /// error.
    pub fn inspect(&self, name: &str) -> ContainerStatus {
        let out = Cmd::new([DOCKER_BIN, "inspect", name]).unchecked().run();
        match out {
            Ok(out) if out.ok() => {
                parse_inspect(name, &out.stdout).unwrap_or_else(|| ContainerStatus::not_found(name))
            }
            _ => ContainerStatus::not_found(name),
        }
    }
}

#[derive(Deserialize)]
struct InspectEntry {
    #[serde(rename = "State")]
    state: InspectState,
    #[serde(rename = "Config")]
    config: InspectConfig,
}

#[derive(Deserialize)]
struct InspectState {
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "StartedAt", default)]
    started_at: Option<String>,
    #[serde(rename = "Health", default)]
    health: Option<InspectHealth>,
}

#[derive(Deserialize)]
struct InspectHealth {
    #[serde(rename = "Status")]
    status: String,
}

#[derive(Deserialize)]
struct InspectConfig {
    #[serde(rename = "Image")]
    image: String,
}

pub(crate) fn parse_inspect(name: &str, json: &str) -> Option<ContainerStatus> {
    let entries: Vec<InspectEntry> = serde_json::from_str(json).ok()?;
    let entry = entries.into_iter().next()?;
    Some(ContainerStatus {
        name: name.to_string(),
        status: entry.state.status,
        health: entry.state.health.map(|h| h.status),
        started_at: entry.state.started_at,
        image: Some(entry.config.image),
    })
}

#[cfg(test)]
#[path = "docker_tests.rs"]
mod tests;
