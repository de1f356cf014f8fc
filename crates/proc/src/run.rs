// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single command execution with captured output.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tracing::debug;

use crate::error::ProcError;

/// Exit code and captured streams from one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdOutput {
    pub exit: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CmdOutput {
    pub fn ok(&self) -> bool {
        self.exit == 0
    }
}

/// One external command.
///
/// Inherits the ambient environment, overlays the supplied keys, and
/// captures both streams. Checked by default: a non-zero exit becomes
/// [`ProcError::Failed`] carrying argv, exit code and stderr. Call
/// [`Cmd::unchecked`] when the caller wants to inspect the exit code
/// itself.
#[derive(Debug, Clone)]
pub struct Cmd {
    argv: Vec<String>,
    env: Vec<(String, String)>,
    check: bool,
    log: Option<PathBuf>,
}

impl Cmd {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            env: Vec::new(),
            check: true,
            log: None,
        }
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn unchecked(mut self) -> Self {
        self.check = false;
        self
    }

    /// Append a per-invocation record to the given run log.
    pub fn log(mut self, path: &Path) -> Self {
        self.log = Some(path.to_path_buf());
        self
    }

    pub fn argv_line(&self) -> String {
        self.argv.join(" ")
    }

    pub fn run(&self) -> Result<CmdOutput, ProcError> {
        let (program, rest) = self.argv.split_first().ok_or(ProcError::EmptyArgv)?;
        debug!(argv = %self.argv_line(), "exec");

        let output = std::process::Command::new(program)
            .args(rest)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ProcError::Spawn {
                program: program.clone(),
                source,
            })?;

        let out = CmdOutput {
            exit: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if let Some(log) = &self.log {
            append_record(log, &self.argv_line(), &out)?;
        }

        if self.check && out.exit != 0 {
            return Err(ProcError::Failed {
                argv: self.argv_line(),
                exit: out.exit,
                stderr: out.stderr,
            });
        }
        Ok(out)
    }
}

/// Append the three-line invocation record: the argv line, stdout, stderr.
pub(crate) fn append_record(path: &Path, argv_line: &str, out: &CmdOutput) -> Result<(), ProcError> {
    let map_err = |source| ProcError::Log {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(map_err)?;
    writeln!(file, "$ {argv_line}").map_err(map_err)?;
    writeln!(file, "{}", out.stdout.trim_end()).map_err(map_err)?;
    writeln!(file, "{}", out.stderr.trim_end()).map_err(map_err)?;
    Ok(())
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
