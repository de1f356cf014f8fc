// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon configuration.

use ob_core::OpsPaths;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Loopback only by default; the reverse proxy terminates TLS and auth
/// stays with the token header.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:9753";

#[derive(Debug, Clone)]
pub struct Config {
    pub paths: OpsPaths,
    pub bind: SocketAddr,
    /// Lock/PID file, exclusive per host.
    pub lock_path: PathBuf,
    /// The daemon's own log (not the per-job run logs).
    pub daemon_log: PathBuf,
}

impl Config {
    /// Fixed layout derived from the two roots, with env overrides:
    /// `OPS_DIR`, `OPS_BACKUP_ROOT`, `OPS_BIND_ADDR`.
    pub fn load() -> Result<Self, ConfigError> {
        let paths = OpsPaths::from_env();
        let bind_raw =
            std::env::var("OPS_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind = bind_raw
            .parse()
            .map_err(|_| ConfigError::BadBindAddr(bind_raw))?;
        Ok(Self {
            lock_path: paths.ops_dir.join("obd.pid"),
            daemon_log: paths.logs_dir().join("obd.log"),
            paths,
            bind,
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid OPS_BIND_ADDR: {0}")]
    BadBindAddr(String),
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
