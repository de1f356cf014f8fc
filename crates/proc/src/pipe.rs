// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Explicit producer→consumer process chains.
//!
//! The streaming dump (`docker exec … pg_dump | gzip > file`) and its
//! restore counterpart are pipelines, but they must not rely on a shell
//! parser for argument splitting. Each stage's stdout feeds the next
//! stage's stdin directly; the final stage may redirect into a file.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use tracing::debug;

use crate::error::ProcError;
use crate::run::{append_record, CmdOutput};

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    stages: Vec<Vec<String>>,
    env: Vec<(String, String)>,
    stdout_to: Option<PathBuf>,
    log: Option<PathBuf>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage<I, S>(mut self, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stages.push(argv.into_iter().map(Into::into).collect());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Redirect the final stage's stdout into a file (truncating).
    pub fn stdout_to(mut self, path: &Path) -> Self {
        self.stdout_to = Some(path.to_path_buf());
        self
    }

    pub fn log(mut self, path: &Path) -> Self {
        self.log = Some(path.to_path_buf());
        self
    }

    /// The whole chain as one display line, shell-style only for logs.
    pub fn display_line(&self) -> String {
        let mut line = self
            .stages
            .iter()
            .map(|argv| argv.join(" "))
            .collect::<Vec<_>>()
            .join(" | ");
        if let Some(path) = &self.stdout_to {
            line.push_str(" > ");
            line.push_str(&path.to_string_lossy());
        }
        line
    }

    /// Run every stage, wiring stdout→stdin between them.
    ///
    /// All stages are waited on; the first stage (in pipeline order) that
    /// exits non-zero fails the run with that stage's argv and stderr.
    pub fn run(&self) -> Result<CmdOutput, ProcError> {
        if self.stages.is_empty() {
            return Err(ProcError::EmptyArgv);
        }
        debug!(pipeline = %self.display_line(), "exec pipeline");

        let mut children: Vec<Child> = Vec::with_capacity(self.stages.len());
        let mut upstream: Option<ChildStdout> = None;

        for (index, argv) in self.stages.iter().enumerate() {
            let (program, rest) = argv.split_first().ok_or(ProcError::EmptyArgv)?;
            let last = index + 1 == self.stages.len();

            let mut cmd = Command::new(program);
            cmd.args(rest)
                .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .stderr(Stdio::piped());

            match upstream.take() {
                Some(prev) => {
                    cmd.stdin(Stdio::from(prev));
                }
                None => {
                    cmd.stdin(Stdio::null());
                }
            }

            if last {
                match &self.stdout_to {
                    Some(path) => {
                        let file = File::create(path).map_err(|source| ProcError::Redirect {
                            path: path.clone(),
                            source,
                        })?;
                        cmd.stdout(Stdio::from(file));
                    }
                    None => {
                        cmd.stdout(Stdio::piped());
                    }
                }
            } else {
                cmd.stdout(Stdio::piped());
            }

            let mut child = cmd.spawn().map_err(|source| ProcError::Spawn {
                program: program.clone(),
                source,
            })?;
            if !last {
                upstream = child.stdout.take();
            }
            children.push(child);
        }

        // Wait on every stage before judging any of them, so a failure in
        // one stage still reaps the others.
        let mut failure: Option<(String, i32, String)> = None;
        let mut final_stdout = String::new();
        let mut all_stderr = String::new();

        for (child, argv) in children.into_iter().zip(&self.stages) {
            let argv_line = argv.join(" ");
            let output = child
                .wait_with_output()
                .map_err(|source| ProcError::Wait {
                    argv: argv_line.clone(),
                    source,
                })?;
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            if !output.stdout.is_empty() {
                final_stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            }
            if !stderr.is_empty() {
                all_stderr.push_str(&stderr);
            }
            let exit = output.status.code().unwrap_or(-1);
            if exit != 0 && failure.is_none() {
                failure = Some((argv_line, exit, stderr));
            }
        }

        let out = CmdOutput {
            exit: failure.as_ref().map(|(_, exit, _)| *exit).unwrap_or(0),
            stdout: final_stdout,
            stderr: all_stderr,
        };

        if let Some(log) = &self.log {
            append_record(log, &self.display_line(), &out)?;
        }

        if let Some((argv, exit, stderr)) = failure {
            return Err(ProcError::Failed { argv, exit, stderr });
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "pipe_tests.rs"]
mod tests;
