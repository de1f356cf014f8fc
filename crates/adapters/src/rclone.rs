// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Off-site sync of run metadata via rclone.

use ob_proc::{Cmd, CmdOutput, ProcError};
use std::path::{Path, PathBuf};

const RCLONE_BIN: &str = "rclone";

#[derive(Debug, Clone)]
pub struct Rclone {
    conf: PathBuf,
}

impl Rclone {
    pub fn new(conf: impl Into<PathBuf>) -> Self {
        Self { conf: conf.into() }
    }

    fn cmd(&self, args: Vec<String>, log: Option<&Path>) -> Cmd {
        let mut argv = vec![
            RCLONE_BIN.to_string(),
            "--config".to_string(),
            self.conf.to_string_lossy().into_owned(),
        ];
        argv.extend(args);
        let mut cmd = Cmd::new(argv);
        if let Some(log) = log {
            cmd = cmd.log(log);
        }
        cmd
    }

    /// Remote names from `rclone listremotes`, without the trailing `:`.
    pub fn list_remotes(&self) -> Result<Vec<String>, ProcError> {
        let out = self.cmd(vec!["listremotes".to_string()], None).run()?;
        Ok(parse_remotes(&out.stdout))
    }

    pub fn remote_exists(&self, remote: &str) -> Result<bool, ProcError> {
        Ok(self.list_remotes()?.iter().any(|r| r == remote))
    }

    /// List the remote's root, proving the remote is reachable.
    pub fn lsd_root(&self, remote: &str, log: &Path) -> Result<CmdOutput, ProcError> {
        self.cmd(vec!["lsd".to_string(), format!("{remote}:")], Some(log))
            .run()
    }

    /// Copy a local directory to `<remote>:<dest>`.
    pub fn copy(
        &self,
        src: &Path,
        remote: &str,
        dest: &str,
        log: &Path,
    ) -> Result<CmdOutput, ProcError> {
        self.cmd(
            vec![
                "copy".to_string(),
                src.to_string_lossy().into_owned(),
                format!("{remote}:{dest}"),
            ],
            Some(log),
        )
        .run()
    }
}

pub(crate) fn parse_remotes(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.trim_end_matches(':').to_string())
        .collect()
}

#[cfg(test)]
#[path = "rclone_tests.rs"]
mod tests;
