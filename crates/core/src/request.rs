// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed request payloads, one variant per action.

use crate::job::Action;
use crate::scope::{Scope, ScopeSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackupReq {
    #[serde(default)]
    pub apps: Option<Vec<String>>,
    #[serde(default)]
    pub scopes: Option<Vec<Scope>>,
}

impl BackupReq {
    /// Requested scopes; an absent or empty list means everything.
    pub fn scope_set(&self) -> ScopeSet {
        match &self.scopes {
            Some(scopes) if !scopes.is_empty() => scopes.iter().copied().collect(),
            _ => ScopeSet::full(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidateReq {
    #[serde(default)]
    pub run_id: Option<String>,
}

/// Restore modes. Destructive modes overwrite live state and sit behind
/// the typed-confirmation gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestoreMode {
    ValidateOnly,
    RestoreDb,
    RestoreFiles,
    RestoreCaddy,
    Full,
    ExportBundle,
}

impl RestoreMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestoreMode::ValidateOnly => "validate-only",
            RestoreMode::RestoreDb => "restore-db",
            RestoreMode::RestoreFiles => "restore-files",
            RestoreMode::RestoreCaddy => "restore-caddy",
            RestoreMode::Full => "full",
            RestoreMode::ExportBundle => "export-bundle",
        }
    }

    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            RestoreMode::RestoreDb
                | RestoreMode::RestoreFiles
                | RestoreMode::RestoreCaddy
                | RestoreMode::Full
        )
    }
}

impl std::fmt::Display for RestoreMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestoreReq {
    pub run_id: String,
    pub mode: RestoreMode,
    #[serde(default)]
    pub apps: Option<Vec<String>>,
    #[serde(default)]
    pub typed_confirmation: Option<String>,
    #[serde(default)]
    pub allow_same_server: bool,
}

impl RestoreReq {
    /// The literal an operator must type to unlock a destructive mode.
    pub fn expected_confirmation(&self) -> String {
        format!("RESTORE {}", self.run_id)
    }

    /// Exact string equality. No trimming, no case folding: `restore x`,
    /// a trailing space, or a doubled space are all rejected.
    pub fn confirmation_ok(&self) -> bool {
        !self.mode.is_destructive()
            || self.typed_confirmation.as_deref() == Some(self.expected_confirmation().as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportReq {
    pub run_id: String,
}

pub const DEFAULT_REMOTE_PATH: &str = "ops-backups";

fn default_remote_path() -> String {
    DEFAULT_REMOTE_PATH.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReq {
    pub remote: String,
    #[serde(default = "default_remote_path")]
    pub remote_path: String,
    #[serde(default)]
    pub run_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudTestReq {
    pub remote: String,
}

/// A job's input, tagged by action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Payload {
    Backup(BackupReq),
    Validate(ValidateReq),
    Prune,
    Restore(RestoreReq),
    ExportBundle(ExportReq),
    UploadLatest(UploadReq),
    UploadSnapshot(UploadReq),
    RcloneTest(CloudTestReq),
}

impl Payload {
    pub fn action(&self) -> Action {
        match self {
            Payload::Backup(_) => Action::Backup,
            Payload::Validate(_) => Action::Validate,
            Payload::Prune => Action::Prune,
            Payload::Restore(_) => Action::Restore,
            Payload::ExportBundle(_) => Action::ExportBundle,
            Payload::UploadLatest(_) => Action::UploadLatest,
            Payload::UploadSnapshot(_) => Action::UploadSnapshot,
            Payload::RcloneTest(_) => Action::RcloneTest,
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
