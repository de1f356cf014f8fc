// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable run registry: a single-table sqlite mirror of job records.
//!
//! Writers open a fresh connection, upsert, and close. That keeps
//! concurrent workers safe without any shared connection state — each
//! write is its own transaction.

use ob_core::JobRecord;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use thiserror::Error;

const SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS runs (
    job_id       TEXT PRIMARY KEY,
    action       TEXT NOT NULL,
    status       TEXT NOT NULL,
    created_at   TEXT NOT NULL,
    updated_at   TEXT NOT NULL,
    payload_json TEXT NOT NULL
)";

/// A row as stored, stringly-typed on purpose: the registry is the
/// durable fallback read path, not the live record.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryRow {
    pub job_id: String,
    pub action: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct RunRegistry {
    db_path: PathBuf,
}

impl RunRegistry {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn db_path(&self) -> &std::path::Path {
        &self.db_path
    }

    fn open(&self) -> Result<Connection, RegistryError> {
        Connection::open(&self.db_path).map_err(|source| RegistryError::Open {
            path: self.db_path.clone(),
            source,
        })
    }

    /// Create the table if it does not exist. Run once at startup.
    pub fn ensure_schema(&self) -> Result<(), RegistryError> {
        let conn = self.open()?;
        conn.execute(SCHEMA, []).map_err(RegistryError::Sql)?;
        Ok(())
    }

    /// Insert or replace a record's durable columns.
    pub fn upsert(&self, record: &JobRecord) -> Result<(), RegistryError> {
        let payload =
            serde_json::to_string(&record.payload).map_err(RegistryError::Payload)?;
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO runs (job_id, action, status, created_at, updated_at, payload_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(job_id) DO UPDATE SET
                 action = excluded.action,
                 status = excluded.status,
                 updated_at = excluded.updated_at,
                 payload_json = excluded.payload_json",
            params![
                record.job_id.as_str(),
                record.action.as_str(),
                record.status.as_str(),
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
                payload,
            ],
        )
        .map_err(RegistryError::Sql)?;
        Ok(())
    }

    /// Fallback lookup for jobs no longer in memory.
    pub fn get(&self, job_id: &str) -> Result<Option<RegistryRow>, RegistryError> {
        let conn = self.open()?;
        let row = conn
            .query_row(
                "SELECT job_id, action, status, created_at, updated_at, payload_json
                 FROM runs WHERE job_id = ?1",
                [job_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()
            .map_err(RegistryError::Sql)?;

        row.map(|(job_id, action, status, created_at, updated_at, payload_json)| {
            let payload =
                serde_json::from_str(&payload_json).map_err(RegistryError::Payload)?;
            Ok(RegistryRow {
                job_id,
                action,
                status,
                created_at,
                updated_at,
                payload,
            })
        })
        .transpose()
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to open registry {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("registry query failed: {0}")]
    Sql(#[source] rusqlite::Error),

    #[error("invalid payload json in registry: {0}")]
    Payload(#[source] serde_json::Error),
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
