// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run manifests: the durable description of what a backup produced.

use crate::scope::Scope;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Artifact families a backup run can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Db,
    Files,
    EnvEncrypted,
    Caddy,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Db => "db",
            ArtifactKind::Files => "files",
            ArtifactKind::EnvEncrypted => "env_encrypted",
            ArtifactKind::Caddy => "caddy",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One produced file: where it landed and what it hashed to at the
/// moment the manifest was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(rename = "type")]
    pub kind: ArtifactKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    pub path: PathBuf,
    pub size: u64,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub ok: bool,
    #[serde(default)]
    pub checks: Vec<serde_json::Value>,
}

impl Default for Validation {
    fn default() -> Self {
        Self {
            ok: true,
            checks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResticInfo {
    pub snapshot_id: Option<String>,
}

fn manifest_kind() -> String {
    "backup".to_string()
}

/// One manifest per backup run, written once to
/// `META/runs/<job_id>/manifest.json` and never rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub job_id: String,
    #[serde(rename = "type", default = "manifest_kind")]
    pub kind: String,
    pub timestamp: DateTime<Utc>,
    pub apps: Vec<String>,
    pub scopes: Vec<Scope>,
    pub host: String,
    pub artifacts: Vec<Artifact>,
    #[serde(default)]
    pub validation: Validation,
    #[serde(default)]
    pub restic: ResticInfo,
}

impl Manifest {
    pub fn new(
        job_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        apps: Vec<String>,
        scopes: Vec<Scope>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            kind: manifest_kind(),
            timestamp,
            apps,
            scopes,
            host: host.into(),
            artifacts: Vec::new(),
            validation: Validation::default(),
            restic: ResticInfo::default(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ManifestError::NotFound(path.to_path_buf()));
            }
            Err(source) => {
                return Err(ManifestError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&raw).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn write_pretty(&self, path: &Path) -> Result<(), ManifestError> {
        let rendered =
            serde_json::to_string_pretty(self).map_err(|source| ManifestError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        std::fs::write(path, rendered).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Render the sibling `checksums.sha256`: one `<hash>␠␠<abs path>`
    /// line per artifact, in artifact order.
    pub fn checksum_lines(&self) -> String {
        let mut out = String::new();
        for artifact in &self.artifacts {
            out.push_str(&artifact.sha256);
            out.push_str("  ");
            out.push_str(&artifact.path.to_string_lossy());
            out.push('\n');
        }
        out
    }
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
