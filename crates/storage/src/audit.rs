// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only audit log: one JSON object per line.
//!
//! Appends use `O_APPEND` so concurrent writers stay atomic at line
//! granularity on POSIX.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;

/// Actor name recorded for token-authenticated HTTP calls.
pub const TOKEN_ACTOR: &str = "ops-dashboard";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub time: DateTime<Utc>,
    pub action: String,
    pub status: String,
    pub actor: String,
    pub details: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        let line = serde_json::to_string(entry).map_err(AuditError::Encode)?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| AuditError::Io {
                path: self.path.clone(),
                source,
            })?;
        writeln!(file, "{line}").map_err(|source| AuditError::Io {
            path: self.path.clone(),
            source,
        })
    }

    /// Read back every entry. Lines that fail to parse are skipped — a
    /// torn tail line must not make the whole log unreadable.
    pub fn entries(&self) -> Result<Vec<AuditEntry>, AuditError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(AuditError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        Ok(raw
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect())
    }
}

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("failed to encode audit entry: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("audit log i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
