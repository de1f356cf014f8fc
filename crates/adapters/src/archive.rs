// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The archiver: tar with zstd compression, plus gzip self-tests.

use ob_proc::{Cmd, ProcError};
use std::path::{Path, PathBuf};

const TAR_BIN: &str = "tar";
const ZSTD_BIN: &str = "zstd";
const GZIP_BIN: &str = "gzip";

#[derive(Debug, Clone, Copy, Default)]
pub struct Archiver;

impl Archiver {
    pub fn new() -> Self {
        Self
    }

    pub(crate) fn create_absolute_args(out: &Path, paths: &[PathBuf]) -> Vec<String> {
        let mut args = vec![
            TAR_BIN.to_string(),
            "--zstd".to_string(),
            "-P".to_string(),
            "-cf".to_string(),
            out.to_string_lossy().into_owned(),
        ];
        args.extend(paths.iter().map(|p| p.to_string_lossy().into_owned()));
        args
    }

    /// Archive absolute paths, preserving them (`-P`). Restores of these
    /// archives extract straight back onto the live tree.
    pub fn create_absolute(
        &self,
        out: &Path,
        paths: &[PathBuf],
        log: &Path,
    ) -> Result<(), ProcError> {
        Cmd::new(Self::create_absolute_args(out, paths))
            .log(log)
            .run()?;
        Ok(())
    }

    /// Archive names relative to `base` (used for staged env bundles,
    /// which deliberately drop their original absolute paths).
    pub fn create_relative(
        &self,
        out: &Path,
        base: &Path,
        names: &[String],
        log: &Path,
    ) -> Result<(), ProcError> {
        let mut args = vec![
            TAR_BIN.to_string(),
            "--zstd".to_string(),
            "-cf".to_string(),
            out.to_string_lossy().into_owned(),
            "-C".to_string(),
            base.to_string_lossy().into_owned(),
        ];
        args.extend(names.iter().cloned());
        Cmd::new(args).log(log).run()?;
        Ok(())
    }

    /// zstd frame integrity check.
    pub fn selftest(&self, archive: &Path, log: &Path) -> Result<(), ProcError> {
        Cmd::new([
            ZSTD_BIN.to_string(),
            "-t".to_string(),
            archive.to_string_lossy().into_owned(),
        ])
        .log(log)
        .run()?;
        Ok(())
    }

    /// List entries. A truncated archive fails here even when the zstd
    /// frames themselves test clean.
    pub fn list(&self, archive: &Path, log: &Path) -> Result<Vec<String>, ProcError> {
        let out = Cmd::new([
            TAR_BIN.to_string(),
            "--zstd".to_string(),
            "-tf".to_string(),
            archive.to_string_lossy().into_owned(),
        ])
        .log(log)
        .run()?;
        Ok(out.stdout.lines().map(str::to_string).collect())
    }

    /// Extract onto the live tree, honoring the absolute member paths.
    pub fn extract_absolute(&self, archive: &Path, log: &Path) -> Result<(), ProcError> {
        Cmd::new([
            TAR_BIN.to_string(),
            "--zstd".to_string(),
            "-xf".to_string(),
            archive.to_string_lossy().into_owned(),
            "-P".to_string(),
        ])
        .log(log)
        .run()?;
        Ok(())
    }

    /// Extract under a directory (bundle staging, tests).
    pub fn extract_into(&self, archive: &Path, dir: &Path, log: &Path) -> Result<(), ProcError> {
        Cmd::new([
            TAR_BIN.to_string(),
            "--zstd".to_string(),
            "-xf".to_string(),
            archive.to_string_lossy().into_owned(),
            "-C".to_string(),
            dir.to_string_lossy().into_owned(),
        ])
        .log(log)
        .run()?;
        Ok(())
    }

    /// gzip integrity check for `.sql.gz` dumps.
    pub fn gzip_test(&self, file: &Path, log: &Path) -> Result<(), ProcError> {
        Cmd::new([
            GZIP_BIN.to_string(),
            "-t".to_string(),
            file.to_string_lossy().into_owned(),
        ])
        .log(log)
        .run()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "archive_tests.rs"]
mod tests;
