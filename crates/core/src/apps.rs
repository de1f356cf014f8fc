// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Application definitions loaded from `apps.yml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One managed application.
///
/// Every field is optional; a scope whose inputs are absent is simply
/// skipped by the backup pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub db_container: Option<String>,
    #[serde(default)]
    pub db_user: Option<String>,
    #[serde(default)]
    pub db_name: Option<String>,
    #[serde(default)]
    pub compose_dir: Option<PathBuf>,
    #[serde(default)]
    pub containers: Vec<String>,
    #[serde(default)]
    pub env_files: Vec<PathBuf>,
    #[serde(default)]
    pub media_paths: Vec<PathBuf>,
    #[serde(default)]
    pub static_paths: Vec<PathBuf>,
    #[serde(default)]
    pub extra_paths: Vec<PathBuf>,
}

impl AppConfig {
    pub fn db_user(&self) -> &str {
        self.db_user.as_deref().unwrap_or("postgres")
    }

    /// Database name, defaulting to the app key.
    pub fn db_name<'a>(&'a self, app_key: &'a str) -> &'a str {
        self.db_name.as_deref().unwrap_or(app_key)
    }
}

/// The full apps config file. Loaded on demand and never cached, so
/// edits take effect without a daemon restart. Key order is irrelevant;
/// the map is a `BTreeMap` only to keep iteration deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppsFile {
    #[serde(default)]
    pub apps: BTreeMap<String, AppConfig>,
}

impl AppsFile {
    pub fn load(path: &Path) -> Result<Self, AppsError> {
        let raw = std::fs::read_to_string(path).map_err(|source| AppsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| AppsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn get(&self, key: &str) -> Option<&AppConfig> {
        self.apps.get(key)
    }

    /// Resolve a selector to `(key, config)` pairs.
    ///
    /// `None` selects every configured app. Any unknown key fails the
    /// whole resolution — callers reject the request before a job exists.
    pub fn resolve(&self, selector: Option<&[String]>) -> Result<Vec<(String, AppConfig)>, AppsError> {
        match selector {
            None => Ok(self
                .apps
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()),
            Some(keys) => keys
                .iter()
                .map(|key| {
                    self.apps
                        .get(key)
                        .map(|cfg| (key.clone(), cfg.clone()))
                        .ok_or_else(|| AppsError::UnknownApp(key.clone()))
                })
                .collect(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppsError {
    #[error("failed to read apps config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse apps config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("unknown app: {0}")]
    UnknownApp(String),
}

#[cfg(test)]
#[path = "apps_tests.rs"]
mod tests;
